//! 타임프레임별 작업 상태.
//!
//! 작업마다 실행 게이트(뮤텍스)와 상태 기록을 가집니다. 게이트를 얻지 못한
//! 트리거는 대기하지 않고 버려집니다. 상태 기록은 짧게만 잠그므로 실행 중에도
//! `snapshot`이 막히지 않습니다.

use chrono::{DateTime, Utc};
use market_core::Timeframe;
use serde::Serialize;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard};

/// 작업 실행 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Idle => f.write_str("idle"),
            JobState::Running => f.write_str("running"),
        }
    }
}

/// 작업 상태 기록.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub state: JobState,
    /// 마지막으로 저장까지 성공한 갱신 시각
    pub last_update: Option<DateTime<Utc>>,
    pub last_started: Option<DateTime<Utc>>,
    pub last_finished: Option<DateTime<Utc>>,
    /// 실제로 시작된 사이클 수
    pub runs: u64,
    /// 실패로 끝난 사이클 수
    pub failures: u64,
    /// 실행 중이라 버려진 트리거 수
    pub coalesced: u64,
    pub last_outcome: Option<String>,
    pub last_error: Option<String>,
    /// 다음 예정 실행 시각
    pub next_fire: Option<DateTime<Utc>>,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            state: JobState::Idle,
            last_update: None,
            last_started: None,
            last_finished: None,
            runs: 0,
            failures: 0,
            coalesced: 0,
            last_outcome: None,
            last_error: None,
            next_fire: None,
        }
    }
}

/// 타임프레임 작업.
#[derive(Debug)]
pub struct Job {
    timeframe: Timeframe,
    gate: Mutex<()>,
    record: RwLock<JobRecord>,
}

impl Job {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            gate: Mutex::new(()),
            record: RwLock::new(JobRecord::default()),
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// 실행 게이트를 얻습니다. 이미 실행 중이면 `None`을 반환하고 병합 횟수를 올립니다.
    pub fn try_begin(&self, now: DateTime<Utc>) -> Option<RunGuard<'_>> {
        match self.gate.try_lock() {
            Ok(permit) => {
                self.update(|r| {
                    r.state = JobState::Running;
                    r.last_started = Some(now);
                });
                Some(RunGuard {
                    job: self,
                    _permit: permit,
                })
            }
            Err(_) => {
                self.update(|r| r.coalesced += 1);
                None
            }
        }
    }

    /// 실행 중인 사이클이 끝날 때까지 기다립니다.
    pub async fn wait_idle(&self) {
        let _idle = self.gate.lock().await;
    }

    /// 상태 기록 스냅샷.
    pub fn snapshot(&self) -> JobRecord {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_update
    }

    pub fn is_running(&self) -> bool {
        self.snapshot().state == JobState::Running
    }

    pub fn set_next_fire(&self, next: Option<DateTime<Utc>>) {
        self.update(|r| r.next_fire = next);
    }

    fn update(&self, f: impl FnOnce(&mut JobRecord)) {
        let mut record = self.record.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut record);
    }
}

/// 실행 중인 사이클의 게이트 보유권.
///
/// drop 시 작업 상태를 `Idle`로 되돌리고 게이트를 해제합니다.
pub struct RunGuard<'a> {
    job: &'a Job,
    _permit: MutexGuard<'a, ()>,
}

impl RunGuard<'_> {
    pub fn timeframe(&self) -> Timeframe {
        self.job.timeframe
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.job.last_update()
    }

    /// 사이클 시작을 기록합니다 (시간/선택 게이트 통과 후).
    pub fn mark_run(&self) {
        self.job.update(|r| r.runs += 1);
    }

    /// 저장 성공 후 갱신 시각을 기록합니다.
    pub fn commit(&self, updated_at: DateTime<Utc>, outcome: &str) {
        self.job.update(|r| {
            r.last_update = Some(updated_at);
            r.last_outcome = Some(outcome.to_string());
            r.last_error = None;
        });
    }

    /// 갱신 시각을 바꾸지 않는 결과를 기록합니다.
    pub fn note(&self, outcome: &str) {
        self.job.update(|r| r.last_outcome = Some(outcome.to_string()));
    }

    /// 실패를 기록합니다. 갱신 시각은 그대로 둡니다.
    pub fn fail(&self, error: &str) {
        self.job.update(|r| {
            r.failures += 1;
            r.last_outcome = Some("failed".to_string());
            r.last_error = Some(error.to_string());
        });
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let finished = Utc::now();
        self.job.update(|r| {
            r.state = JobState::Idle;
            r.last_finished = Some(finished);
        });
    }
}
