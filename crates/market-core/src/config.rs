//! 설정 관리.
//!
//! 설정은 다음 순서로 겹쳐서 로드됩니다:
//! 1. `AppConfig::default()` 내장 기본값
//! 2. TOML 설정 파일 (없으면 건너뜀)
//! 3. `MARKET__` 접두사 환경 변수 (예: `MARKET__STORAGE__DATA_DIR`)

use crate::error::{CoreError, CoreResult};
use crate::types::{MergeMode, Timeframe};
use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub universe: UniverseConfig,
    pub storage: StorageConfig,
    pub provider: ProviderConfig,
    pub scheduler: SchedulerConfig,
    pub timeframes: TimeframesConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// 시장
// =============================================================================

/// 거래소 세션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// IANA 시간대 이름
    pub timezone: String,
    /// 개장 시각 (HH:MM)
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    /// 마감 시각 (HH:MM)
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
    /// 휴장일 목록 (YYYY-MM-DD)
    pub holidays: Vec<NaiveDate>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            open: hm(9, 15),
            close: hm(15, 30),
            holidays: nse_holidays_2024(),
        }
    }
}

impl MarketConfig {
    /// 시간대 이름을 파싱합니다.
    pub fn tz(&self) -> CoreResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CoreError::InvalidTimezone(self.timezone.clone()))
    }
}

/// 2024년 NSE 휴장일.
fn nse_holidays_2024() -> Vec<NaiveDate> {
    [
        (1, 26),
        (3, 8),
        (3, 29),
        (4, 11),
        (4, 17),
        (5, 1),
        (8, 15),
        (8, 26),
        (10, 2),
        (10, 12),
        (11, 1),
        (11, 15),
        (12, 25),
    ]
    .into_iter()
    .filter_map(|(m, d)| NaiveDate::from_ymd_opt(2024, m, d))
    .collect()
}

// =============================================================================
// 종목 유니버스
// =============================================================================

/// 종목 유니버스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// 종목 세트 이름 (development, production, sector_banking, sector_it, sector_auto)
    pub symbol_set: String,
    /// 명시적 종목 목록. 비어 있지 않으면 `symbol_set`보다 우선합니다.
    pub symbols: Vec<String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            symbol_set: "development".to_string(),
            symbols: Vec::new(),
        }
    }
}

// =============================================================================
// 저장소
// =============================================================================

/// 파일 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// 파일명 접두사
    pub file_prefix: String,
    /// 날짜별 백업 보관 기간 (일)
    pub retention_days: u32,
    /// 저장 시 날짜별 백업 스냅샷 작성 여부
    pub backups: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_prefix: "market_data".to_string(),
            retention_days: 30,
            backups: true,
        }
    }
}

impl StorageConfig {
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }
}

// =============================================================================
// 데이터 제공자
// =============================================================================

/// 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// 종목별 요청 사이 대기 시간 (밀리초)
    pub rate_limit_delay_ms: u64,
    /// 가용성 확인에 사용할 종목
    pub probe_symbol: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 2000,
            probe_symbol: "RELIANCE.NS".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

// =============================================================================
// 스케줄러
// =============================================================================

/// 스케줄러 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 시작 시 보충 실행 사이 간격 (초)
    pub catch_up_delay_secs: u64,
    /// 종료 시 실행 중인 사이클을 기다리는 최대 시간 (초)
    pub shutdown_grace_secs: u64,
    /// 보관 기간 정리 시각 (HH:MM, 거래소 시간대)
    #[serde(with = "hhmm")]
    pub cleanup_time: NaiveTime,
    /// 스마트 선택 시 오래된 데이터로 판단하는 기준 (분)
    pub smart_staleness_minutes: u64,
    /// 스마트 선택의 기준 타임프레임
    pub smart_reference: Timeframe,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            catch_up_delay_secs: 5,
            shutdown_grace_secs: 60,
            cleanup_time: hm(2, 0),
            smart_staleness_minutes: 60,
            smart_reference: Timeframe::M15,
        }
    }
}

impl SchedulerConfig {
    pub fn catch_up_delay(&self) -> Duration {
        Duration::from_secs(self.catch_up_delay_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn smart_staleness(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.smart_staleness_minutes.min(MAX_INTERVAL_MINUTES) as i64)
    }
}

// =============================================================================
// 타임프레임
// =============================================================================

/// 타임프레임별 설정 모음.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeframesConfig {
    #[serde(rename = "15m")]
    pub m15: TimeframeConfig,
    #[serde(rename = "1h")]
    pub h1: TimeframeConfig,
    #[serde(rename = "1d")]
    pub d1: TimeframeConfig,
    #[serde(rename = "1wk")]
    pub w1: TimeframeConfig,
}

impl Default for TimeframesConfig {
    fn default() -> Self {
        Self {
            m15: TimeframeConfig::defaults_for(Timeframe::M15),
            h1: TimeframeConfig::defaults_for(Timeframe::H1),
            d1: TimeframeConfig::defaults_for(Timeframe::D1),
            w1: TimeframeConfig::defaults_for(Timeframe::W1),
        }
    }
}

impl TimeframesConfig {
    pub fn get(&self, timeframe: Timeframe) -> &TimeframeConfig {
        match timeframe {
            Timeframe::M15 => &self.m15,
            Timeframe::H1 => &self.h1,
            Timeframe::D1 => &self.d1,
            Timeframe::W1 => &self.w1,
        }
    }

    pub fn get_mut(&mut self, timeframe: Timeframe) -> &mut TimeframeConfig {
        match timeframe {
            Timeframe::M15 => &mut self.m15,
            Timeframe::H1 => &mut self.h1,
            Timeframe::D1 => &mut self.d1,
            Timeframe::W1 => &mut self.w1,
        }
    }

    /// 활성화된 타임프레임 (짧은 주기 순).
    pub fn enabled(&self) -> Vec<Timeframe> {
        Timeframe::ALL
            .into_iter()
            .filter(|tf| self.get(*tf).enabled)
            .collect()
    }
}

/// 단일 타임프레임 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeframeConfig {
    pub enabled: bool,
    /// 제공자 요청 기간 (예: "5d", "1y")
    pub period: String,
    /// 명목 갱신 주기 (분)
    pub refresh_minutes: u64,
    /// 정규장 중에만 갱신 여부
    pub market_hours_only: bool,
    pub merge_mode: MergeMode,
    /// 이 시각 이후에만 갱신 (거래소 시간대)
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<NaiveTime>,
    /// 이 요일에만 갱신
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_day: Option<Weekday>,
    /// 종목별 최신성 기반 선택 사용 여부
    #[serde(default)]
    pub smart_selection: bool,
    pub trigger: TriggerConfig,
}

impl TimeframeConfig {
    /// 타임프레임별 기본 설정.
    pub fn defaults_for(timeframe: Timeframe) -> Self {
        let weekdays = vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ];
        let (period, market_hours_only, preferred_time, preferred_day, trigger) = match timeframe {
            Timeframe::M15 => ("5d", true, None, None, TriggerConfig::Interval { minutes: 15 }),
            Timeframe::H1 => ("5d", true, None, None, TriggerConfig::Interval { minutes: 60 }),
            Timeframe::D1 => (
                "1y",
                false,
                Some(hm(16, 0)),
                None,
                TriggerConfig::Calendar {
                    at: hm(16, 30),
                    weekdays,
                },
            ),
            Timeframe::W1 => (
                "2y",
                false,
                Some(hm(8, 0)),
                Some(Weekday::Sat),
                TriggerConfig::Calendar {
                    at: hm(8, 0),
                    weekdays: vec![Weekday::Sat],
                },
            ),
        };

        Self {
            enabled: true,
            period: period.to_string(),
            refresh_minutes: timeframe.as_minutes(),
            market_hours_only,
            merge_mode: timeframe.default_merge_mode(),
            preferred_time,
            preferred_day,
            smart_selection: false,
            trigger,
        }
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.refresh_minutes.min(MAX_INTERVAL_MINUTES) as i64)
    }
}

/// 갱신 간격, 트리거 간격, 스마트 선택 기준에 허용되는 최대 분 (366일).
pub const MAX_INTERVAL_MINUTES: u64 = 366 * 24 * 60;

/// 트리거 규칙.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerConfig {
    /// N분마다 실행
    Interval { minutes: u64 },
    /// 지정 요일의 지정 시각에 실행 (거래소 시간대)
    Calendar {
        #[serde(with = "hhmm")]
        at: NaiveTime,
        weekdays: Vec<Weekday>,
    },
}

// =============================================================================
// 로깅
// =============================================================================

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty, json, compact
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

// =============================================================================
// 로드 및 검증
// =============================================================================

impl AppConfig {
    /// 기본값 → 설정 파일 → 환경 변수 순으로 설정을 로드하고 검증합니다.
    ///
    /// 설정 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())?;

        let builder = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("MARKET")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// 설정 값의 일관성을 검증합니다.
    pub fn validate(&self) -> CoreResult<()> {
        self.market.tz()?;

        if self.market.close <= self.market.open {
            return Err(CoreError::Config(format!(
                "market.close({})는 market.open({})보다 늦어야 합니다",
                self.market.close, self.market.open
            )));
        }

        for timeframe in Timeframe::ALL {
            let tf = self.timeframes.get(timeframe);
            if tf.refresh_minutes == 0 || tf.refresh_minutes > MAX_INTERVAL_MINUTES {
                return Err(CoreError::Config(format!(
                    "timeframes.{}.refresh_minutes는 1..={} 범위여야 합니다: {}",
                    timeframe, MAX_INTERVAL_MINUTES, tf.refresh_minutes
                )));
            }
            match &tf.trigger {
                TriggerConfig::Interval { minutes }
                    if *minutes == 0 || *minutes > MAX_INTERVAL_MINUTES =>
                {
                    return Err(CoreError::Config(format!(
                        "timeframes.{}.trigger: 간격은 1..={} 분이어야 합니다: {}",
                        timeframe, MAX_INTERVAL_MINUTES, minutes
                    )));
                }
                TriggerConfig::Calendar { weekdays, .. } if weekdays.is_empty() => {
                    return Err(CoreError::Config(format!(
                        "timeframes.{}.trigger: 요일이 비어 있습니다",
                        timeframe
                    )));
                }
                _ => {}
            }
        }

        if self.scheduler.smart_staleness_minutes > MAX_INTERVAL_MINUTES {
            return Err(CoreError::Config(format!(
                "scheduler.smart_staleness_minutes는 {} 이하여야 합니다: {}",
                MAX_INTERVAL_MINUTES, self.scheduler.smart_staleness_minutes
            )));
        }

        if !self.scheduler.smart_reference.is_intraday() {
            return Err(CoreError::Config(format!(
                "scheduler.smart_reference는 장중 타임프레임이어야 합니다: {}",
                self.scheduler.smart_reference
            )));
        }

        Ok(())
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// `HH:MM` (또는 `HH:MM:SS`) 형식 시각 직렬화.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|e| format!("잘못된 시각 '{}': {}", raw, e))
    }
}

mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => super::hhmm::serialize(t, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| super::hhmm::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
