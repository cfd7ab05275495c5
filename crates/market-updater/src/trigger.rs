//! 타임프레임 트리거.
//!
//! 트리거는 스케줄러 시작 시 설정에서 만들어지며 이후 변경되지 않습니다.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use market_core::TriggerConfig;
use std::fmt;

/// 트리거 규칙.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// 고정 간격 (직전 실행 시각 + 간격)
    Interval { every: Duration },
    /// 지정 요일/시각 (거래소 시간대)
    Calendar { at: NaiveTime, weekdays: Vec<Weekday> },
}

impl Trigger {
    /// 설정에서 트리거를 만듭니다. 간격이 표현 범위를 벗어나면 `None`.
    pub fn from_config(config: &TriggerConfig) -> Option<Self> {
        match config {
            TriggerConfig::Interval { minutes } => {
                let minutes = i64::try_from(*minutes).ok()?;
                Some(Trigger::Interval {
                    every: Duration::try_minutes(minutes)?,
                })
            }
            TriggerConfig::Calendar { at, weekdays } => Some(Trigger::Calendar {
                at: *at,
                weekdays: weekdays.clone(),
            }),
        }
    }

    /// 매일 지정 시각에 실행하는 트리거.
    pub fn daily_at(at: NaiveTime) -> Self {
        Trigger::Calendar {
            at,
            weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        }
    }

    /// `now` 이후의 다음 실행 시각.
    ///
    /// 간격 트리거는 직전 실행 시각(`previous`, 없으면 `now`)에 간격을 더합니다.
    /// 그 시각이 이미 지났다면 밀린 실행을 한 번으로 합쳐 `now`를 반환합니다.
    /// 달력 트리거는 `now`와 `previous`보다 모두 엄격하게 늦은 가장 가까운
    /// 요일/시각을 반환합니다. 벽시계가 뒤로 밀려도 같은 슬롯이 두 번 실행되지 않습니다.
    pub fn next_fire(&self, now: DateTime<Tz>, previous: Option<DateTime<Tz>>) -> Option<DateTime<Tz>> {
        match self {
            Trigger::Interval { every } => {
                if *every <= Duration::zero() {
                    return None;
                }
                let next = previous.unwrap_or(now) + *every;
                Some(if next < now { now } else { next })
            }
            Trigger::Calendar { at, weekdays } => {
                let tz = now.timezone();
                let floor = previous.map_or(now, |p| p.max(now));
                let start = floor.date_naive();
                // 요일이 하나라도 있으면 8일 안에 반드시 찾음
                (0..=7)
                    .filter_map(|offset| start.checked_add_days(chrono::Days::new(offset)))
                    .filter(|date| weekdays.contains(&date.weekday()))
                    .filter_map(|date| tz.from_local_datetime(&date.and_time(*at)).earliest())
                    .find(|candidate| *candidate > floor)
            }
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Interval { every } => write!(f, "every {}m", every.num_minutes()),
            Trigger::Calendar { at, weekdays } => {
                let days: Vec<String> = weekdays.iter().map(|d| d.to_string()).collect();
                write!(f, "at {} on {}", at.format("%H:%M"), days.join(","))
            }
        }
    }
}
