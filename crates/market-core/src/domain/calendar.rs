//! 거래소 세션 캘린더.
//!
//! 모든 계산은 호스트 시간대와 무관하게 거래소 고정 시간대에서 수행됩니다.
//! 휴장일 목록은 정적 설정 데이터이며, 목록에 없는 날짜는 평일이면 거래일로
//! 간주합니다. 따라서 휴장일 목록이 해당 연도를 포함하지 않으면 그 해의 모든
//! 평일이 거래일로 취급됩니다. `covers_year`로 이를 확인할 수 있습니다.

use crate::config::MarketConfig;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

// =============================================================================
// 시간 소스
// =============================================================================

/// 현재 시각 공급자.
pub trait TimeSource: Send + Sync + fmt::Debug {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 설정/전진시키는 시계 (테스트 및 재현용).
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new<T: TimeZone>(start: DateTime<T>) -> Self {
        Self {
            now: Mutex::new(start.with_timezone(&Utc)),
        }
    }

    /// 현재 시각을 지정한 시각으로 설정합니다.
    pub fn set<T: TimeZone>(&self, ts: DateTime<T>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = ts.with_timezone(&Utc);
    }

    /// 현재 시각을 주어진 만큼 전진시킵니다.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// 세션
// =============================================================================

/// 특정 시점의 거래소 세션 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSession {
    /// 거래일 개장 전
    PreMarket,
    /// 정규장 (개장/마감 시각 포함)
    Open,
    /// 거래일 마감 후
    PostMarket,
    /// 주말 휴장
    ClosedWeekend,
    /// 공휴일 휴장
    ClosedHoliday,
}

impl MarketSession {
    pub fn is_open(&self) -> bool {
        matches!(self, MarketSession::Open)
    }
}

impl fmt::Display for MarketSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketSession::PreMarket => "pre_market",
            MarketSession::Open => "open",
            MarketSession::PostMarket => "post_market",
            MarketSession::ClosedWeekend => "closed_weekend",
            MarketSession::ClosedHoliday => "closed_holiday",
        };
        f.write_str(s)
    }
}

// =============================================================================
// 시장 시계
// =============================================================================

/// 거래소 캘린더와 세션 계산기.
#[derive(Debug, Clone)]
pub struct MarketClock {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
    holidays: BTreeSet<NaiveDate>,
    source: Arc<dyn TimeSource>,
}

impl MarketClock {
    /// 새 시장 시계를 생성합니다. 마감 시각은 개장 시각보다 늦어야 합니다.
    pub fn new(
        tz: Tz,
        open: NaiveTime,
        close: NaiveTime,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> CoreResult<Self> {
        if close <= open {
            return Err(CoreError::Calendar(format!(
                "마감 시각({})이 개장 시각({})보다 늦어야 합니다",
                close, open
            )));
        }
        Ok(Self {
            tz,
            open,
            close,
            holidays: holidays.into_iter().collect(),
            source: Arc::new(SystemTimeSource),
        })
    }

    /// 시장 설정에서 생성합니다.
    pub fn from_config(config: &MarketConfig) -> CoreResult<Self> {
        Self::new(
            config.tz()?,
            config.open,
            config.close,
            config.holidays.iter().copied(),
        )
    }

    /// 시간 소스를 교체합니다.
    pub fn with_time_source(mut self, source: Arc<dyn TimeSource>) -> Self {
        self.source = source;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn open_time(&self) -> NaiveTime {
        self.open
    }

    pub fn close_time(&self) -> NaiveTime {
        self.close
    }

    /// 거래소 시간대 기준 현재 시각.
    pub fn now(&self) -> DateTime<Tz> {
        self.source.now_utc().with_timezone(&self.tz)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// 주말도 휴장일도 아닌 날짜인지 확인합니다.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date.weekday()) && !self.is_holiday(date)
    }

    /// 휴장일 목록에 해당 연도의 날짜가 하나라도 있는지 확인합니다.
    pub fn covers_year(&self, year: i32) -> bool {
        self.holidays.iter().any(|d| d.year() == year)
    }

    /// 주어진 시각의 세션 상태.
    ///
    /// 주말 → 휴장일 → 시각 순서로 판정합니다.
    pub fn session<T: TimeZone>(&self, ts: &DateTime<T>) -> MarketSession {
        let local = ts.with_timezone(&self.tz);
        let date = local.date_naive();

        if is_weekend(date.weekday()) {
            return MarketSession::ClosedWeekend;
        }
        if self.is_holiday(date) {
            return MarketSession::ClosedHoliday;
        }

        let time = local.time();
        if time < self.open {
            MarketSession::PreMarket
        } else if time <= self.close {
            MarketSession::Open
        } else {
            MarketSession::PostMarket
        }
    }

    pub fn session_now(&self) -> MarketSession {
        self.session(&self.now())
    }

    pub fn is_open<T: TimeZone>(&self, ts: &DateTime<T>) -> bool {
        self.session(ts).is_open()
    }

    pub fn is_open_now(&self) -> bool {
        self.session_now().is_open()
    }

    /// `ts` 이후(포함) 가장 가까운 개장 중 시각.
    ///
    /// 거래일 장중이면 `ts` 자체를, 개장 전이면 당일 개장 시각을 반환합니다.
    /// 마감 시각 정각을 포함해 마감 이후라면 다음 거래일 개장 시각으로 넘어갑니다.
    pub fn next_open<T: TimeZone>(&self, ts: &DateTime<T>) -> DateTime<Tz> {
        let local = ts.with_timezone(&self.tz);
        let mut date = local.date_naive();

        if self.is_trading_day(date) {
            let time = local.time();
            if time < self.open {
                return self.localize(date, self.open);
            }
            if time < self.close {
                return local;
            }
        }

        // 휴장일 목록은 유한하므로 반드시 거래일에 도달합니다.
        loop {
            date = match date.succ_opt() {
                Some(next) => next,
                None => return local,
            };
            if self.is_trading_day(date) {
                return self.localize(date, self.open);
            }
        }
    }

    /// `[a, b]` 구간(양끝 포함)의 거래일 수. `a > b`이면 0입니다.
    pub fn trading_days_between<T: TimeZone>(&self, a: &DateTime<T>, b: &DateTime<T>) -> u32 {
        if a > b {
            return 0;
        }
        let start = a.with_timezone(&self.tz).date_naive();
        let end = b.with_timezone(&self.tz).date_naive();
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_trading_day(*d))
            .count() as u32
    }

    /// 거래소 시간대의 날짜+시각을 절대 시각으로 변환합니다.
    ///
    /// 일광절약시간 전환으로 존재하지 않는 시각이면 UTC 기준으로 해석합니다.
    fn localize(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
        let naive = date.and_time(time);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&naive))
    }
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn clock() -> MarketClock {
        MarketClock::new(
            Kolkata,
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            [
                NaiveDate::from_ymd_opt(2024, 1, 26).unwrap(),
                NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            ],
        )
        .unwrap()
    }

    fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Kolkata.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_session_boundaries_inclusive() {
        let clock = clock();
        // 2024-06-03 월요일
        assert_eq!(clock.session(&ist(2024, 6, 3, 9, 14)), MarketSession::PreMarket);
        assert_eq!(clock.session(&ist(2024, 6, 3, 9, 15)), MarketSession::Open);
        assert_eq!(clock.session(&ist(2024, 6, 3, 15, 30)), MarketSession::Open);
        assert_eq!(clock.session(&ist(2024, 6, 3, 15, 31)), MarketSession::PostMarket);
    }

    #[test]
    fn test_weekend_and_holiday() {
        let clock = clock();
        assert_eq!(clock.session(&ist(2024, 6, 1, 11, 0)), MarketSession::ClosedWeekend);
        assert_eq!(clock.session(&ist(2024, 1, 26, 11, 0)), MarketSession::ClosedHoliday);
        // 휴장일이 토요일이 아닌 한 주말 판정이 우선
        assert_eq!(clock.session(&ist(2024, 6, 2, 11, 0)), MarketSession::ClosedWeekend);
    }

    #[test]
    fn test_session_uses_exchange_timezone() {
        let clock = clock();
        // 04:00 UTC = 09:30 IST
        let utc = Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap();
        assert!(clock.is_open(&utc));
    }

    #[test]
    fn test_next_open() {
        let clock = clock();
        // 장중이면 그대로
        assert_eq!(clock.next_open(&ist(2024, 6, 3, 10, 0)), ist(2024, 6, 3, 10, 0));
        // 개장 전이면 당일 개장
        assert_eq!(clock.next_open(&ist(2024, 6, 3, 7, 0)), ist(2024, 6, 3, 9, 15));
        // 마감 정각은 다음 거래일
        assert_eq!(clock.next_open(&ist(2024, 6, 3, 15, 30)), ist(2024, 6, 4, 9, 15));
        // 금요일 장 마감 후 → 월요일
        assert_eq!(clock.next_open(&ist(2024, 6, 7, 16, 0)), ist(2024, 6, 10, 9, 15));
        // 휴장일 전날 → 휴장일 건너뜀 (2024-08-15 목요일)
        assert_eq!(clock.next_open(&ist(2024, 8, 14, 18, 0)), ist(2024, 8, 16, 9, 15));
    }

    #[test]
    fn test_trading_days_between() {
        let clock = clock();
        // 2024-06-03(월) ~ 2024-06-09(일): 5 거래일
        assert_eq!(clock.trading_days_between(&ist(2024, 6, 3, 0, 0), &ist(2024, 6, 9, 0, 0)), 5);
        assert_eq!(clock.trading_days_between(&ist(2024, 6, 3, 10, 0), &ist(2024, 6, 3, 11, 0)), 1);
        assert_eq!(clock.trading_days_between(&ist(2024, 6, 9, 0, 0), &ist(2024, 6, 3, 0, 0)), 0);
        // 2024-08-12(월) ~ 2024-08-16(금): 휴장일 1일 제외
        assert_eq!(clock.trading_days_between(&ist(2024, 8, 12, 0, 0), &ist(2024, 8, 16, 0, 0)), 4);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let result = MarketClock::new(
            Kolkata,
            NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_manual_time_source() {
        let source = Arc::new(ManualTimeSource::new(ist(2024, 6, 3, 9, 0)));
        let clock = clock().with_time_source(source.clone());
        assert_eq!(clock.session_now(), MarketSession::PreMarket);

        source.advance(chrono::Duration::minutes(30));
        assert!(clock.is_open_now());

        source.set(ist(2024, 6, 8, 10, 0));
        assert_eq!(clock.session_now(), MarketSession::ClosedWeekend);
    }

    #[test]
    fn test_covers_year() {
        let clock = clock();
        assert!(clock.covers_year(2024));
        assert!(!clock.covers_year(2025));
    }
}
