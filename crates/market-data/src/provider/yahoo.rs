//! Yahoo Finance 데이터 제공자.

use super::{DataProvider, FetchReport, SymbolFailure};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use market_core::{DataRecord, Dataset, Instrument, ProviderConfig, Timeframe};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Yahoo Finance 제공자.
///
/// 종목마다 개별 요청을 보내며, 요청 사이에 설정된 지연을 둡니다.
pub struct YahooProvider {
    connector: yahoo_finance_api::YahooConnector,
    rate_limit_delay: Duration,
    probe_symbol: String,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self {
            connector,
            rate_limit_delay: config.rate_limit_delay(),
            probe_symbol: config.probe_symbol.clone(),
        })
    }

    /// 단일 종목 조회.
    async fn fetch_symbol(
        &self,
        instrument: &Instrument,
        period: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<DataRecord>> {
        let interval = timeframe.as_str();
        debug!(symbol = %instrument, interval, range = period, "Yahoo Finance API 호출");

        let response = self
            .connector
            .get_quote_range(instrument.as_str(), interval, period)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", instrument, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        let mut skipped = 0usize;
        let records: Vec<DataRecord> = quotes
            .iter()
            .filter_map(|q| {
                let record = quote_to_record(
                    instrument,
                    q.timestamp as i64,
                    [q.open, q.high, q.low, q.close],
                    q.volume,
                );
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        if skipped > 0 {
            debug!(symbol = %instrument, skipped, "유효하지 않은 봉 제외");
        }

        Ok(records)
    }
}

/// Yahoo 응답 한 건을 레코드로 변환합니다. 가격이 유한한 양수가 아니면 `None`.
fn quote_to_record(
    instrument: &Instrument,
    timestamp: i64,
    [open, high, low, close]: [f64; 4],
    volume: u64,
) -> Option<DataRecord> {
    let ts = Utc.timestamp_opt(timestamp, 0).single()?;
    let price = |v: f64| {
        if v.is_finite() && v > 0.0 {
            Decimal::from_f64_retain(v)
        } else {
            None
        }
    };

    Some(DataRecord::new(
        instrument.clone(),
        ts,
        price(open)?,
        price(high)?,
        price(low)?,
        price(close)?,
        Decimal::from(volume),
    ))
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn is_available(&self) -> bool {
        let probe = Instrument::new(self.probe_symbol.as_str());
        match self.fetch_symbol(&probe, "1d", Timeframe::D1).await {
            Ok(records) if !records.is_empty() => true,
            Ok(_) => {
                warn!(probe = %probe, "Yahoo Finance 가용성 확인: 데이터 없음");
                false
            }
            Err(e) => {
                warn!(probe = %probe, error = %e, "Yahoo Finance 가용성 확인 실패");
                false
            }
        }
    }

    async fn fetch(
        &self,
        symbols: &[Instrument],
        period: &str,
        timeframe: Timeframe,
    ) -> Result<FetchReport> {
        info!(count = symbols.len(), interval = %timeframe, period, "종목 데이터 조회 시작");

        let mut dataset = Dataset::new();
        let mut failures = Vec::new();

        for (i, instrument) in symbols.iter().enumerate() {
            match self.fetch_symbol(instrument, period, timeframe).await {
                Ok(records) if records.is_empty() => {
                    warn!(symbol = %instrument, "데이터 없음");
                    failures.push(SymbolFailure::new(instrument.clone(), "no data returned"));
                }
                Ok(records) => {
                    debug!(symbol = %instrument, records = records.len(), "조회 완료");
                    for record in records {
                        dataset.push(record);
                    }
                }
                Err(e) => {
                    warn!(symbol = %instrument, error = %e, "종목 조회 실패");
                    failures.push(SymbolFailure::new(instrument.clone(), e.to_string()));
                }
            }

            if i + 1 < symbols.len() && !self.rate_limit_delay.is_zero() {
                tokio::time::sleep(self.rate_limit_delay).await;
            }
        }

        FetchReport::collect(symbols.len(), dataset, failures)
    }
}
