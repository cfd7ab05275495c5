//! 시장 인식 갱신 스케줄러.
//!
//! 타임프레임마다 하나의 작업을 두고, 트리거가 울리면 작업 단위로 갱신 사이클을
//! 실행합니다. 같은 타임프레임의 사이클은 동시에 하나만 실행되며, 실행 중에
//! 도착한 트리거는 대기열에 쌓이지 않고 버려집니다.
//!
//! 사이클 순서: 시간 게이트 → 종목 선택 → 조회 → 병합 → 저장 → 갱신 시각 기록

use crate::error::{Result, UpdateError};
use crate::job::Job;
use crate::policy::UpdatePolicy;
use crate::stats::{CycleOutcome, CycleStats, RunMode};
use crate::status::{JobStatus, Lifecycle, SchedulerStatus};
use crate::trigger::Trigger;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use market_core::universe::resolve_universe;
use market_core::{AppConfig, Dataset, Instrument, MarketClock, Timeframe};
use market_data::{merge_and_persist, DataProvider, DurableStore, FetchReport};
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn, Instrument as _};

/// 실행 중인 스케줄러의 취소 토큰과 백그라운드 태스크.
struct Running {
    token: CancellationToken,
    tracker: TaskTracker,
}

struct Inner {
    config: AppConfig,
    clock: MarketClock,
    provider: Arc<dyn DataProvider>,
    store: Arc<dyn DurableStore>,
    jobs: HashMap<Timeframe, Job>,
    policies: HashMap<Timeframe, UpdatePolicy>,
    triggers: HashMap<Timeframe, Trigger>,
    universe: RwLock<Arc<Vec<Instrument>>>,
    lifecycle: std::sync::Mutex<Lifecycle>,
    control: Mutex<Option<Running>>,
    cleanup_next_fire: RwLock<Option<DateTime<Utc>>>,
}

/// 수동 갱신 결과.
#[derive(Debug)]
pub struct ManualUpdateReport {
    pub results: Vec<(Timeframe, Result<CycleOutcome>)>,
}

impl ManualUpdateReport {
    /// 모든 타임프레임이 실제로 실행되어 성공했는지 확인합니다.
    ///
    /// 다른 사이클과 겹쳐 버려진 타임프레임은 실패로 봅니다.
    pub fn succeeded(&self) -> bool {
        !self.results.is_empty()
            && self
                .results
                .iter()
                .all(|(_, r)| matches!(r, Ok(outcome) if !matches!(outcome, CycleOutcome::Coalesced)))
    }
}

/// 갱신 스케줄러.
pub struct UpdateScheduler {
    inner: Arc<Inner>,
}

impl UpdateScheduler {
    /// 스케줄러를 생성합니다. 활성화된 타임프레임마다 작업, 정책, 트리거를 만듭니다.
    pub fn new(
        config: AppConfig,
        clock: MarketClock,
        provider: Arc<dyn DataProvider>,
        store: Arc<dyn DurableStore>,
    ) -> Result<Self> {
        config.validate()?;

        let enabled = config.timeframes.enabled();
        if enabled.is_empty() {
            return Err(UpdateError::Config("활성화된 타임프레임이 없습니다".into()));
        }

        let mut jobs = HashMap::new();
        let mut policies = HashMap::new();
        let mut triggers = HashMap::new();
        for tf in enabled {
            jobs.insert(tf, Job::new(tf));
            policies.insert(tf, UpdatePolicy::for_timeframe(tf, &config));
            let trigger = Trigger::from_config(&config.timeframes.get(tf).trigger).ok_or_else(|| {
                UpdateError::Config(format!("timeframes.{}.trigger: 간격이 범위를 벗어났습니다", tf))
            })?;
            triggers.insert(tf, trigger);
        }

        let universe = resolve_universe(&config.universe);
        info!(
            provider = provider.name(),
            store = store.name(),
            timeframes = jobs.len(),
            universe = universe.len(),
            "스케줄러 생성"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                clock,
                provider,
                store,
                jobs,
                policies,
                triggers,
                universe: RwLock::new(Arc::new(universe)),
                lifecycle: std::sync::Mutex::new(Lifecycle::Stopped),
                control: Mutex::new(None),
                cleanup_next_fire: RwLock::new(None),
            }),
        })
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle()
    }

    pub fn clock(&self) -> &MarketClock {
        &self.inner.clock
    }

    /// 활성화된 타임프레임 (정렬됨).
    pub fn timeframes(&self) -> Vec<Timeframe> {
        self.inner.timeframes()
    }

    /// 현재 종목 유니버스.
    pub fn universe(&self) -> Arc<Vec<Instrument>> {
        self.inner.universe()
    }

    /// 이후 사이클에서 사용할 종목 유니버스를 교체합니다.
    ///
    /// 실행 중인 사이클은 시작 시점의 유니버스를 계속 사용합니다.
    pub fn set_universe(&self, symbols: Vec<Instrument>) {
        let universe = dedup(symbols);
        info!(universe = universe.len(), "종목 유니버스 교체");
        *self
            .inner
            .universe
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(universe);
    }

    /// 스케줄러를 시작합니다.
    ///
    /// 데이터 제공자를 사용할 수 없으면 `ProviderUnavailable`을 반환하고 `Stopped`에
    /// 머뭅니다. 성공하면 트리거를 등록하고, 비어 있는 데이터셋에 대한 보충 사이클을
    /// 백그라운드로 띄운 뒤 완료를 기다리지 않고 반환합니다.
    pub async fn start(&self) -> Result<()> {
        let inner = &self.inner;
        let mut control = inner.control.lock().await;

        let current = inner.lifecycle();
        if current != Lifecycle::Stopped || control.is_some() {
            return Err(UpdateError::InvalidState(format!(
                "이미 실행 중입니다 ({})",
                current
            )));
        }

        inner.set_lifecycle(Lifecycle::Starting);
        info!(provider = inner.provider.name(), "데이터 제공자 확인 중");
        if !inner.provider.is_available().await {
            inner.set_lifecycle(Lifecycle::Stopped);
            error!(provider = inner.provider.name(), "데이터 제공자 사용 불가, 시작 중단");
            return Err(UpdateError::ProviderUnavailable(inner.provider.name().to_string()));
        }

        let now = inner.clock.now();
        if !inner.clock.covers_year(now.year()) {
            warn!(
                year = now.year(),
                "휴장일 목록에 올해가 없습니다. 평일은 모두 거래일로 간주합니다"
            );
        }

        let token = CancellationToken::new();
        let tracker = TaskTracker::new();

        for tf in inner.timeframes() {
            let Some(trigger) = inner.triggers.get(&tf).cloned() else {
                continue;
            };
            info!(timeframe = %tf, trigger = %trigger, "트리거 등록");
            tracker.spawn(trigger_loop(
                Arc::clone(inner),
                tf,
                trigger,
                token.clone(),
                tracker.clone(),
            ));
        }

        let cleanup = Trigger::daily_at(inner.config.scheduler.cleanup_time);
        info!(trigger = %cleanup, "보관 기간 정리 트리거 등록");
        tracker.spawn(cleanup_loop(Arc::clone(inner), cleanup, token.clone()));

        inner.set_lifecycle(Lifecycle::Started);

        let mut empty = Vec::new();
        for tf in inner.timeframes() {
            match inner.store.latest_timestamp(tf, None).await {
                Ok(None) => empty.push(tf),
                Ok(Some(_)) => {}
                Err(e) => warn!(timeframe = %tf, error = %e, "저장소 확인 실패, 보충 생략"),
            }
        }
        if !empty.is_empty() {
            info!(timeframes = ?empty, "빈 데이터셋 보충 예약");
            tracker.spawn(catch_up_launcher(
                Arc::clone(inner),
                empty,
                token.clone(),
                tracker.clone(),
            ));
        }

        *control = Some(Running { token, tracker });
        info!("스케줄러 시작됨");
        Ok(())
    }

    /// 스케줄러를 중지합니다.
    ///
    /// 트리거를 즉시 취소하고 실행 중인 사이클(수동 갱신 포함)이 끝나기를 종료
    /// 유예 시간만큼 기다립니다. 이미 중지된 상태라면 아무것도 하지 않습니다.
    pub async fn stop(&self) -> Result<()> {
        let inner = &self.inner;
        let mut control = inner.control.lock().await;

        let Some(running) = control.take() else {
            debug!("이미 중지된 스케줄러");
            return Ok(());
        };

        inner.set_lifecycle(Lifecycle::Stopping);
        info!("스케줄러 중지 중");

        running.token.cancel();
        running.tracker.close();

        // 수동 사이클은 트래커 밖에서 돌기 때문에 작업 게이트까지 비워질 때를 기다림
        let grace = inner.config.scheduler.shutdown_grace();
        let drained = async {
            running.tracker.wait().await;
            for job in inner.jobs.values() {
                job.wait_idle().await;
            }
        };
        if tokio::time::timeout(grace, drained).await.is_err() {
            warn!(
                grace_secs = grace.as_secs(),
                "종료 유예 시간 초과, 실행 중인 사이클을 기다리지 않고 중지합니다"
            );
        }

        for job in inner.jobs.values() {
            job.set_next_fire(None);
        }
        *inner
            .cleanup_next_fire
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        inner.set_lifecycle(Lifecycle::Stopped);
        info!("스케줄러 중지됨");
        Ok(())
    }

    /// 정기 갱신 사이클을 한 번 실행합니다 (정책의 시간/선택 게이트 적용).
    pub async fn run_update(&self, timeframe: Timeframe) -> Result<CycleOutcome> {
        self.inner.run_cycle(timeframe, RunMode::Scheduled, None).await
    }

    /// 수동 갱신.
    ///
    /// 시간 게이트를 생략하지만 작업별 상호 배제는 그대로 지킵니다. 타임프레임을
    /// 지정하지 않으면 활성화된 모든 타임프레임을 순서대로 실행합니다.
    /// 스케줄러 생명주기와 무관하게 호출할 수 있습니다.
    pub async fn manual_update(
        &self,
        timeframe: Option<Timeframe>,
        symbols: Option<Vec<Instrument>>,
    ) -> Result<ManualUpdateReport> {
        let targets = match timeframe {
            Some(tf) => {
                if !self.inner.jobs.contains_key(&tf) {
                    return Err(UpdateError::UnknownTimeframe(tf.to_string()));
                }
                vec![tf]
            }
            None => self.inner.timeframes(),
        };

        let symbols = symbols.map(dedup);
        let mut results = Vec::with_capacity(targets.len());
        for tf in targets {
            let result = self
                .inner
                .run_cycle(tf, RunMode::Manual, symbols.clone())
                .await;
            if let Err(e) = &result {
                warn!(timeframe = %tf, error = %e, "수동 갱신 실패");
            }
            results.push((tf, result));
        }

        Ok(ManualUpdateReport { results })
    }

    /// 저장된 데이터셋을 종목과 날짜로 걸러 읽습니다.
    ///
    /// 날짜는 거래소 시간대 기준이며 `start`와 `end` 모두 그날 전체를 포함합니다.
    /// 작업 상태와 무관하게 비활성화된 타임프레임도 읽을 수 있습니다.
    pub async fn load_data(
        &self,
        timeframe: Timeframe,
        symbols: Option<&[Instrument]>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Dataset> {
        let inner = &self.inner;
        let dataset = inner
            .store
            .read(timeframe)
            .await
            .map_err(|e| UpdateError::StoreUnavailable(e.to_string()))?;

        let tz = inner.clock.timezone();
        let lower = match start {
            Some(date) => Bound::Included(day_start(tz, date)?),
            None => Bound::Unbounded,
        };
        let upper = match end.map(|date| date.succ_opt()) {
            Some(Some(next)) => Bound::Excluded(day_start(tz, next)?),
            Some(None) | None => Bound::Unbounded,
        };

        let loaded = dataset.filter(symbols, (lower, upper));
        info!(
            timeframe = %timeframe,
            stored = dataset.len(),
            loaded = loaded.len(),
            "데이터 로드"
        );
        Ok(loaded)
    }

    /// 저장하지 않는 조회.
    ///
    /// 데이터 제공자에서 받은 결과를 정렬만 해서 돌려주며, 저장소와 작업 상태는
    /// 건드리지 않습니다. 종목을 지정하지 않으면 현재 유니버스 전체를 조회합니다.
    pub async fn preview_fetch(
        &self,
        timeframe: Timeframe,
        symbols: Option<Vec<Instrument>>,
    ) -> Result<FetchReport> {
        let inner = &self.inner;
        let symbols = match symbols {
            Some(explicit) => dedup(explicit),
            None => inner.universe().to_vec(),
        };
        if symbols.is_empty() {
            return Ok(FetchReport::default());
        }

        let period = &inner.config.timeframes.get(timeframe).period;
        info!(
            timeframe = %timeframe,
            symbols = symbols.len(),
            period = %period,
            "미리보기 조회"
        );
        let mut report = inner
            .provider
            .fetch(&symbols, period, timeframe)
            .await
            .map_err(|e| UpdateError::FetchTotalFailure(e.to_string()))?;
        report.dataset = report.dataset.normalize();
        Ok(report)
    }

    /// 보관 기간이 지난 스냅샷을 정리합니다.
    pub async fn cleanup(&self) -> Result<usize> {
        self.inner.cleanup().await
    }

    /// 상태 스냅샷. 실행 중인 사이클을 기다리지 않습니다.
    pub fn status(&self) -> SchedulerStatus {
        let inner = &self.inner;
        let now = inner.clock.now();

        let jobs = inner
            .timeframes()
            .into_iter()
            .filter_map(|tf| {
                let job = inner.jobs.get(&tf)?;
                Some(JobStatus {
                    timeframe: tf,
                    policy: inner
                        .policies
                        .get(&tf)
                        .map(|p| p.to_string())
                        .unwrap_or_default(),
                    trigger: inner
                        .triggers
                        .get(&tf)
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    record: job.snapshot(),
                })
            })
            .collect();

        SchedulerStatus {
            lifecycle: inner.lifecycle(),
            generated_at: now.with_timezone(&Utc),
            market_session: inner.clock.session(&now),
            next_market_open: inner.clock.next_open(&now).with_timezone(&Utc),
            universe_size: inner.universe().len(),
            jobs,
            next_cleanup: *inner
                .cleanup_next_fire
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        if let Ok(mut control) = self.inner.control.try_lock() {
            if let Some(running) = control.take() {
                running.token.cancel();
                running.tracker.close();
            }
        }
    }
}

impl Inner {
    fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_lifecycle(&self, next: Lifecycle) {
        let mut state = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *state;
        debug!(from = %previous, to = %next, "생명주기 전환");
        *state = next;
    }

    fn timeframes(&self) -> Vec<Timeframe> {
        let mut tfs: Vec<Timeframe> = self.jobs.keys().copied().collect();
        tfs.sort();
        tfs
    }

    fn universe(&self) -> Arc<Vec<Instrument>> {
        Arc::clone(&self.universe.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// 갱신 사이클 하나를 실행합니다.
    async fn run_cycle(
        &self,
        timeframe: Timeframe,
        mode: RunMode,
        symbols: Option<Vec<Instrument>>,
    ) -> Result<CycleOutcome> {
        let span = market_core::cycle_span!(timeframe, mode);
        self.run_cycle_inner(timeframe, mode, symbols)
            .instrument(span)
            .await
    }

    async fn run_cycle_inner(
        &self,
        timeframe: Timeframe,
        mode: RunMode,
        symbols: Option<Vec<Instrument>>,
    ) -> Result<CycleOutcome> {
        let (Some(job), Some(policy)) = (self.jobs.get(&timeframe), self.policies.get(&timeframe))
        else {
            return Err(UpdateError::UnknownTimeframe(timeframe.to_string()));
        };
        let tf_config = self.config.timeframes.get(timeframe);

        let started_at = self.clock.now().with_timezone(&Utc);
        let Some(guard) = job.try_begin(started_at) else {
            debug!("같은 타임프레임 사이클 실행 중, 트리거 병합");
            return Ok(CycleOutcome::Coalesced);
        };
        let started = Instant::now();

        let selected = if mode.bypasses_gates() {
            match symbols {
                Some(explicit) => explicit,
                None => self.universe().to_vec(),
            }
        } else {
            if !policy.due_now(&self.clock, guard.last_update()) {
                debug!(policy = %policy, "갱신 시점 아님");
                guard.note(CycleOutcome::NotDue.label());
                return Ok(CycleOutcome::NotDue);
            }
            let universe = self.universe();
            match policy
                .symbols_to_update(&self.clock, &universe, self.store.as_ref())
                .await
            {
                Ok(selected) => selected,
                Err(e) => {
                    error!(error = %e, "종목 선택 중 저장소 조회 실패");
                    guard.fail(&e.to_string());
                    return Err(UpdateError::StoreUnavailable(e.to_string()));
                }
            }
        };

        if selected.is_empty() {
            debug!(policy = %policy, "갱신할 종목 없음");
            guard.note(CycleOutcome::EmptySelection.label());
            return Ok(CycleOutcome::EmptySelection);
        }

        guard.mark_run();
        info!(
            symbols = selected.len(),
            period = %tf_config.period,
            "갱신 사이클 시작"
        );

        let report = match self
            .provider
            .fetch(&selected, &tf_config.period, timeframe)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "데이터 조회 실패, 사이클 중단");
                guard.fail(&e.to_string());
                return Err(UpdateError::FetchTotalFailure(e.to_string()));
            }
        };

        for failure in &report.failures {
            warn!(
                symbol = %failure.instrument,
                reason = %failure.reason,
                "종목 조회 실패, 나머지 종목으로 계속"
            );
        }

        let fetched = report.fetched_instruments().len();
        let records_fetched = report.dataset.len();
        let failures = report.failures;

        let merge = match merge_and_persist(
            self.store.as_ref(),
            timeframe,
            report.dataset,
            tf_config.merge_mode,
        )
        .await
        {
            Ok(merge) => merge,
            Err(e) => {
                error!(error = %e, "병합 결과 저장 실패, 이전 데이터 유지");
                guard.fail(&e.to_string());
                return Err(UpdateError::PersistFailure(e.to_string()));
            }
        };

        let stats = CycleStats {
            timeframe,
            mode,
            requested: selected.len(),
            fetched,
            failed_symbols: failures,
            records_fetched,
            merge,
            elapsed: started.elapsed(),
        };
        let outcome = CycleOutcome::Updated(stats);

        guard.commit(self.clock.now().with_timezone(&Utc), outcome.label());
        if let Some(stats) = outcome.stats() {
            stats.log_summary();
        }
        Ok(outcome)
    }

    /// 백그라운드 사이클. 결과는 로그와 작업 상태로만 남습니다.
    async fn run_logged(&self, timeframe: Timeframe, mode: RunMode) {
        match self.run_cycle(timeframe, mode, None).await {
            Ok(outcome) => debug!(timeframe = %timeframe, mode = %mode, outcome = outcome.label(), "사이클 종료"),
            Err(e) if e.is_cycle_failure() => {
                warn!(timeframe = %timeframe, mode = %mode, error = %e, "사이클 실패, 다음 트리거에서 재시도")
            }
            Err(e) => error!(timeframe = %timeframe, mode = %mode, error = %e, "사이클 실행 불가"),
        }
    }

    async fn cleanup(&self) -> Result<usize> {
        let max_age = self.config.storage.retention();
        match self.store.retention_cleanup(max_age).await {
            Ok(removed) => {
                info!(
                    removed,
                    retention_days = self.config.storage.retention_days,
                    "보관 기간 정리 완료"
                );
                Ok(removed)
            }
            Err(e) => Err(UpdateError::PersistFailure(e.to_string())),
        }
    }
}

/// 거래소 시간대 기준 날짜의 시작 시각 (UTC).
fn day_start(tz: Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .ok_or_else(|| {
            UpdateError::InvalidState(format!("{} 자정을 시간대 {}로 표현할 수 없습니다", date, tz))
        })
}

/// 타임프레임 트리거 루프. 울릴 때마다 사이클을 별도 태스크로 띄웁니다.
///
/// 사이클은 작업 게이트로 직렬화되므로, 실행 중에 울린 트리거는 병합됩니다.
async fn trigger_loop(
    inner: Arc<Inner>,
    timeframe: Timeframe,
    trigger: Trigger,
    token: CancellationToken,
    tracker: TaskTracker,
) {
    let mut previous: Option<DateTime<Tz>> = None;

    loop {
        let now = inner.clock.now();
        let Some(next) = trigger.next_fire(now, previous) else {
            warn!(timeframe = %timeframe, trigger = %trigger, "다음 실행 시각 없음, 트리거 종료");
            break;
        };
        if let Some(job) = inner.jobs.get(&timeframe) {
            job.set_next_fire(Some(next.with_timezone(&Utc)));
        }

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::select! {
            _ = token.cancelled() => {
                debug!(timeframe = %timeframe, "트리거 취소");
                break;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        previous = Some(next);
        let cycle = Arc::clone(&inner);
        tracker.spawn(async move { cycle.run_logged(timeframe, RunMode::Scheduled).await });
    }
}

/// 보관 기간 정리 루프. 실패는 로그만 남깁니다.
async fn cleanup_loop(inner: Arc<Inner>, trigger: Trigger, token: CancellationToken) {
    let mut previous: Option<DateTime<Tz>> = None;

    loop {
        let now = inner.clock.now();
        let Some(next) = trigger.next_fire(now, previous) else {
            break;
        };
        *inner
            .cleanup_next_fire
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(next.with_timezone(&Utc));

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        previous = Some(next);
        if let Err(e) = inner.cleanup().await {
            warn!(error = %e, "보관 기간 정리 실패");
        }
    }
}

/// 빈 데이터셋 보충 사이클을 일정 간격으로 띄웁니다.
async fn catch_up_launcher(
    inner: Arc<Inner>,
    timeframes: Vec<Timeframe>,
    token: CancellationToken,
    tracker: TaskTracker,
) {
    let delay = inner.config.scheduler.catch_up_delay();

    for (i, tf) in timeframes.into_iter().enumerate() {
        if i > 0 {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("보충 예약 취소");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        } else if token.is_cancelled() {
            return;
        }

        info!(timeframe = %tf, "빈 데이터셋 보충 사이클 시작");
        let cycle = Arc::clone(&inner);
        tracker.spawn(async move { cycle.run_logged(tf, RunMode::CatchUp).await });
    }
}

/// 순서를 유지하며 중복과 빈 종목을 제거합니다.
fn dedup(symbols: Vec<Instrument>) -> Vec<Instrument> {
    let mut seen = BTreeSet::new();
    symbols
        .into_iter()
        .filter(|s| !s.as_str().is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let symbols = vec![
            Instrument::new("TCS.NS"),
            Instrument::new(" "),
            Instrument::new("INFY.NS"),
            Instrument::new("TCS.NS"),
        ];
        assert_eq!(
            dedup(symbols),
            vec![Instrument::new("TCS.NS"), Instrument::new("INFY.NS")]
        );
    }

    #[test]
    fn test_manual_report_success() {
        let ok = ManualUpdateReport {
            results: vec![
                (Timeframe::M15, Ok(CycleOutcome::EmptySelection)),
                (Timeframe::D1, Ok(CycleOutcome::NotDue)),
            ],
        };
        assert!(ok.succeeded());

        let coalesced = ManualUpdateReport {
            results: vec![(Timeframe::M15, Ok(CycleOutcome::Coalesced))],
        };
        assert!(!coalesced.succeeded());

        let failed = ManualUpdateReport {
            results: vec![
                (Timeframe::M15, Ok(CycleOutcome::EmptySelection)),
                (Timeframe::D1, Err(UpdateError::PersistFailure("disk".into()))),
            ],
        };
        assert!(!failed.succeeded());
        assert!(!ManualUpdateReport { results: vec![] }.succeeded());
    }
}
