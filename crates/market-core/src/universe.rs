//! 정적 종목 유니버스.
//!
//! NSE 종목 세트를 이름으로 조회합니다. 알 수 없는 세트 이름은
//! `development` 세트로 대체됩니다.

use crate::config::UniverseConfig;
use crate::types::Instrument;
use tracing::warn;

/// 기본 종목 세트 이름.
pub const DEFAULT_SYMBOL_SET: &str = "development";

/// 사용 가능한 종목 세트 이름.
pub const SYMBOL_SETS: [&str; 5] = [
    "development",
    "production",
    "sector_banking",
    "sector_it",
    "sector_auto",
];

const NIFTY_50: &[&str] = &[
    "RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ICICIBANK.NS",
    "HDFC.NS", "KOTAKBANK.NS", "HINDUNILVR.NS", "SBIN.NS", "BHARTIARTL.NS",
    "ASIANPAINT.NS", "ITC.NS", "AXISBANK.NS", "LT.NS", "DMART.NS",
    "MARUTI.NS", "TITAN.NS", "BAJFINANCE.NS", "NESTLEIND.NS", "ULTRACEMCO.NS",
    "WIPRO.NS", "ONGC.NS", "NTPC.NS", "TECHM.NS", "HCLTECH.NS",
    "POWERGRID.NS", "TATAMOTORS.NS", "COALINDIA.NS", "BAJAJFINSV.NS", "M&M.NS",
    "SUNPHARMA.NS", "TATASTEEL.NS", "GRASIM.NS", "ADANIPORTS.NS", "BRITANNIA.NS",
    "DRREDDY.NS", "EICHERMOT.NS", "CIPLA.NS", "BPCL.NS", "HEROMOTOCO.NS",
    "JSWSTEEL.NS", "INDUSINDBK.NS", "DIVISLAB.NS", "TATACONSUM.NS", "APOLLOHOSP.NS",
    "BAJAJ-AUTO.NS", "HINDALCO.NS", "SHREECEM.NS", "UPL.NS", "SBILIFE.NS",
];

const DEVELOPMENT: &[&str] = &[
    "RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ICICIBANK.NS",
];

const BANKING: &[&str] = &[
    "HDFCBANK.NS", "ICICIBANK.NS", "SBIN.NS", "KOTAKBANK.NS", "AXISBANK.NS",
    "INDUSINDBK.NS", "FEDERALBNK.NS", "BANKBARODA.NS", "PNB.NS", "IDFCFIRSTB.NS",
];

const IT: &[&str] = &[
    "TCS.NS", "INFY.NS", "WIPRO.NS", "TECHM.NS", "HCLTECH.NS",
    "LTI.NS", "MINDTREE.NS", "MPHASIS.NS", "LTTS.NS", "COFORGE.NS",
];

const AUTO: &[&str] = &[
    "MARUTI.NS", "TATAMOTORS.NS", "M&M.NS", "EICHERMOT.NS", "BAJAJ-AUTO.NS",
    "ASHOKLEY.NS", "HEROMOTOCO.NS", "TVSMOTOR.NS", "BHARATFORG.NS", "MOTHERSUMI.NS",
];

/// 이름으로 종목 세트를 조회합니다.
pub fn symbol_set(name: &str) -> Option<Vec<Instrument>> {
    let symbols = match name.trim().to_lowercase().as_str() {
        "development" => DEVELOPMENT,
        "production" => NIFTY_50,
        "sector_banking" => BANKING,
        "sector_it" => IT,
        "sector_auto" => AUTO,
        _ => return None,
    };
    Some(symbols.iter().copied().map(Instrument::from).collect())
}

/// 설정에서 갱신 대상 종목 목록을 결정합니다.
///
/// 명시적 종목 목록이 있으면 그대로 사용하고, 없으면 세트 이름으로 조회합니다.
pub fn resolve_universe(config: &UniverseConfig) -> Vec<Instrument> {
    if !config.symbols.is_empty() {
        let mut seen = std::collections::HashSet::new();
        return config
            .symbols
            .iter()
            .map(Instrument::new)
            .filter(|i| !i.as_str().is_empty() && seen.insert(i.clone()))
            .collect();
    }

    symbol_set(&config.symbol_set).unwrap_or_else(|| {
        warn!(
            symbol_set = %config.symbol_set,
            fallback = DEFAULT_SYMBOL_SET,
            "알 수 없는 종목 세트, 기본 세트로 대체"
        );
        DEVELOPMENT.iter().copied().map(Instrument::from).collect()
    })
}
