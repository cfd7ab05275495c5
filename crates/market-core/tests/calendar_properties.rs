//! 시장 캘린더 속성 테스트
//!
//! - 개장/마감 경계 시각은 항상 Open
//! - 주말은 시각과 무관하게 ClosedWeekend
//! - next_open(ts) >= ts 이고 결과 시각은 항상 Open
//! - trading_days_between은 역순 구간에서 0

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use market_core::{AppConfig, MarketClock, MarketSession};
use proptest::prelude::*;

fn default_clock() -> MarketClock {
    MarketClock::from_config(&AppConfig::default().market).unwrap()
}

// ── Strategies ───────────────────────────────────────────────────────

/// 2023-01-01 ~ 2026-12-31 사이 임의 UTC 시각 (분 단위).
fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    (0i64..4 * 366 * 24 * 60).prop_map(move |m| start + Duration::minutes(m))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0i64..4 * 366).prop_map(move |d| start + Duration::days(d))
}

fn at(clock: &MarketClock, date: NaiveDate, time: chrono::NaiveTime) -> DateTime<Tz> {
    clock
        .timezone()
        .from_local_datetime(&date.and_time(time))
        .single()
        .unwrap()
}

proptest! {
    #[test]
    fn boundaries_are_open_on_trading_days(date in arb_date()) {
        let clock = default_clock();
        prop_assume!(clock.is_trading_day(date));

        prop_assert!(clock.is_open(&at(&clock, date, clock.open_time())));
        prop_assert!(clock.is_open(&at(&clock, date, clock.close_time())));
    }

    #[test]
    fn weekends_are_always_closed(date in arb_date(), minute in 0u32..1440) {
        use chrono::Datelike;
        prop_assume!(matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun));

        let clock = default_clock();
        let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0).unwrap();
        prop_assert_eq!(clock.session(&at(&clock, date, time)), MarketSession::ClosedWeekend);
    }

    #[test]
    fn next_open_is_not_earlier_and_is_open(ts in arb_timestamp()) {
        let clock = default_clock();
        let next = clock.next_open(&ts);

        prop_assert!(next >= ts.with_timezone(&clock.timezone()));
        prop_assert!(clock.is_open(&next));
    }

    #[test]
    fn reversed_range_has_no_trading_days(a in arb_timestamp(), b in arb_timestamp()) {
        let clock = default_clock();
        prop_assume!(a > b);
        prop_assert_eq!(clock.trading_days_between(&a, &b), 0);
    }

    #[test]
    fn single_day_range_counts_trading_day(date in arb_date()) {
        let clock = default_clock();
        let ts = at(&clock, date, clock.open_time());
        let expected = u32::from(clock.is_trading_day(date));
        prop_assert_eq!(clock.trading_days_between(&ts, &ts), expected);
    }
}

#[test]
fn close_boundary_next_open_advances() {
    let clock = default_clock();
    // 2024-03-28(목) 마감 → 03-29 휴장(Good Friday) → 주말 → 04-01(월)
    let close = at(&clock, NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(), clock.close_time());
    assert_eq!(clock.session(&close), MarketSession::Open);

    let next = clock.next_open(&close);
    assert_eq!(next, at(&clock, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), clock.open_time()));
}

#[test]
fn uncovered_year_treats_weekdays_as_trading_days() {
    let clock = default_clock();
    assert!(!clock.covers_year(2025));
    // 2025-01-26은 일요일, 2025-08-15(금)는 목록에 없으므로 거래일
    assert!(clock.is_trading_day(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()));
}
