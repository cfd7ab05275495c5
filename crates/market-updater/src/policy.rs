//! 타임프레임별 갱신 정책.
//!
//! 정책은 두 단계로 판단합니다:
//! - `due_now`: 지금 이 타임프레임을 갱신할 시점인가 (시간 게이트)
//! - `symbols_to_update`: 어떤 종목을 갱신할 것인가 (선택 게이트)
//!
//! 스마트 정책을 제외한 정책은 전체 종목 또는 빈 목록만 반환합니다.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use market_core::{AppConfig, Instrument, MarketClock, Timeframe};
use market_data::{DataError, DurableStore};
use std::fmt;

/// 일봉 갱신 허용 시각 기본값 (장 마감 후).
const DEFAULT_DAILY_GATE: (u32, u32) = (16, 0);

/// 갱신 정책.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// 장중 분봉/시간봉: 장중에만, 명목 주기 경과 후 갱신
    Intraday {
        interval: chrono::Duration,
        market_hours_only: bool,
    },
    /// 일봉: 지정 시각 이후, 날짜가 바뀐 경우에만 갱신
    Daily { not_before: NaiveTime },
    /// 주봉: 지정 요일에만, 최소 간격 경과 후 갱신
    Weekly {
        day: Weekday,
        min_gap: chrono::Duration,
    },
    /// 기준 타임프레임의 종목별 최신 시각으로 오래된 종목만 선택
    ///
    /// 기준 타임프레임 하나의 최신성을 모든 타임프레임의 근사치로 사용합니다.
    Smart {
        reference: Timeframe,
        staleness: chrono::Duration,
    },
}

impl UpdatePolicy {
    /// 타임프레임과 설정으로 정책을 선택합니다.
    pub fn for_timeframe(timeframe: Timeframe, config: &AppConfig) -> Self {
        let tf = config.timeframes.get(timeframe);

        if tf.smart_selection {
            return UpdatePolicy::Smart {
                reference: config.scheduler.smart_reference,
                staleness: config.scheduler.smart_staleness(),
            };
        }

        match timeframe {
            Timeframe::M15 | Timeframe::H1 => UpdatePolicy::Intraday {
                interval: tf.refresh_interval(),
                market_hours_only: tf.market_hours_only,
            },
            Timeframe::D1 => UpdatePolicy::Daily {
                not_before: tf.preferred_time.unwrap_or_else(|| {
                    let (h, m) = DEFAULT_DAILY_GATE;
                    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
                }),
            },
            Timeframe::W1 => UpdatePolicy::Weekly {
                day: tf.preferred_day.unwrap_or(Weekday::Sat),
                min_gap: tf.refresh_interval(),
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UpdatePolicy::Intraday { .. } => "intraday",
            UpdatePolicy::Daily { .. } => "daily",
            UpdatePolicy::Weekly { .. } => "weekly",
            UpdatePolicy::Smart { .. } => "smart",
        }
    }

    /// 지금 갱신할 시점인지 판단합니다. 갱신 기록이 없으면 게이트 조건만 봅니다.
    pub fn due_now(&self, clock: &MarketClock, last_update: Option<DateTime<Utc>>) -> bool {
        let now = clock.now();
        match self {
            UpdatePolicy::Intraday {
                interval,
                market_hours_only,
            } => {
                if *market_hours_only && !clock.is_open(&now) {
                    return false;
                }
                last_update.map_or(true, |last| now.with_timezone(&Utc) - last >= *interval)
            }
            UpdatePolicy::Daily { not_before } => {
                if now.time() < *not_before {
                    return false;
                }
                let today = now.date_naive();
                last_update.map_or(true, |last| {
                    today > last.with_timezone(&clock.timezone()).date_naive()
                })
            }
            UpdatePolicy::Weekly { day, min_gap } => {
                if now.weekday() != *day {
                    return false;
                }
                last_update.map_or(true, |last| now.with_timezone(&Utc) - last >= *min_gap)
            }
            UpdatePolicy::Smart { staleness, .. } => last_update.map_or(true, |last| {
                clock.is_open(&now) && now.with_timezone(&Utc) - last >= *staleness
            }),
        }
    }

    /// 갱신할 종목을 선택합니다.
    ///
    /// 장이 닫힌 장중 정책은 저장소나 제공자에 접근하지 않고 빈 목록을 반환합니다.
    pub async fn symbols_to_update(
        &self,
        clock: &MarketClock,
        universe: &[Instrument],
        store: &dyn DurableStore,
    ) -> Result<Vec<Instrument>, DataError> {
        let now = clock.now();
        match self {
            UpdatePolicy::Intraday {
                market_hours_only, ..
            } => {
                if *market_hours_only && !clock.is_open(&now) {
                    return Ok(Vec::new());
                }
                Ok(universe.to_vec())
            }
            UpdatePolicy::Daily { not_before } => {
                if now.time() < *not_before {
                    return Ok(Vec::new());
                }
                Ok(universe.to_vec())
            }
            UpdatePolicy::Weekly { day, .. } => {
                if now.weekday() != *day {
                    return Ok(Vec::new());
                }
                Ok(universe.to_vec())
            }
            UpdatePolicy::Smart {
                reference,
                staleness,
            } => {
                let open = clock.is_open(&now);
                let now = now.with_timezone(&Utc);
                let mut selected = Vec::new();
                for instrument in universe {
                    match store.latest_timestamp(*reference, Some(instrument)).await? {
                        None => selected.push(instrument.clone()),
                        Some(latest) if open && now - latest > *staleness => {
                            selected.push(instrument.clone())
                        }
                        Some(_) => {}
                    }
                }
                Ok(selected)
            }
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
