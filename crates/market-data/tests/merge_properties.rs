//! 병합 속성 테스트
//!
//! - 추가-중복제거 병합 결과에는 중복 키가 없고 정렬되어 있음
//! - 기존/새 입력에 모두 있는 키는 새 레코드가 남음
//! - 전체 교체 결과는 새 레코드의 키 집합과 같음

use chrono::{Duration, TimeZone, Utc};
use market_core::{DataRecord, Dataset, Instrument, MergeMode};
use market_data::merge_datasets;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

const SYMBOLS: [&str; 3] = ["INFY.NS", "RELIANCE.NS", "TCS.NS"];

fn arb_record() -> impl Strategy<Value = DataRecord> {
    (0usize..SYMBOLS.len(), 0i64..20, 1i64..100_000).prop_map(|(s, slot, price)| {
        let ts = Utc.with_ymd_and_hms(2024, 6, 3, 3, 45, 0).unwrap() + Duration::minutes(15 * slot);
        let p = Decimal::new(price, 2);
        DataRecord::new(Instrument::new(SYMBOLS[s]), ts, p, p, p, p, Decimal::from(slot))
    })
}

fn arb_dataset() -> impl Strategy<Value = Vec<DataRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

proptest! {
    #[test]
    fn append_dedup_has_unique_sorted_keys_and_prefers_new(
        existing in arb_dataset(),
        new in arb_dataset(),
    ) {
        // 새 입력 안에서도 나중 레코드가 우선
        let mut expected_new = BTreeMap::new();
        for r in &new {
            expected_new.insert((r.instrument.clone(), r.timestamp), r.clone());
        }

        let merged = merge_datasets(
            Dataset::from_records(existing.clone()),
            Dataset::from_records(new.clone()),
            MergeMode::AppendDedup,
        );

        prop_assert!(merged.is_normalized());

        let keys: BTreeSet<_> = existing.iter().chain(new.iter())
            .map(|r| (r.instrument.clone(), r.timestamp))
            .collect();
        prop_assert_eq!(merged.len(), keys.len());

        for r in merged.records() {
            if let Some(newer) = expected_new.get(&(r.instrument.clone(), r.timestamp)) {
                prop_assert_eq!(r, newer);
            }
        }
    }

    #[test]
    fn full_replace_keeps_only_new_keys(existing in arb_dataset(), new in arb_dataset()) {
        let merged = merge_datasets(
            Dataset::from_records(existing),
            Dataset::from_records(new.clone()),
            MergeMode::FullReplace,
        );

        prop_assert!(merged.is_normalized());
        let new_keys: BTreeSet<_> = new.iter().map(|r| (r.instrument.clone(), r.timestamp)).collect();
        let merged_keys: BTreeSet<_> = merged.records().iter()
            .map(|r| (r.instrument.clone(), r.timestamp))
            .collect();
        prop_assert_eq!(merged_keys, new_keys);
    }
}
