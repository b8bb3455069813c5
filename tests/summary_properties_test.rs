//! Property tests for summary statistics and schema reporting

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use recibos_importer::test_utils::{dataset_from_rows, CapturingLog};
use recibos_importer::{CellValue, DateRangeOutcome, RecordLoader, EXPECTED_COLUMNS};

proptest! {
    #[test]
    fn prop_sum_and_mean_follow_the_totals(
        totals in prop::collection::vec(0.01f64..100_000.0, 1..50)
    ) {
        let rows: Vec<Vec<CellValue>> = totals
            .iter()
            .map(|t| vec![CellValue::Number(*t)])
            .collect();
        let mut dataset = dataset_from_rows(&["total"], rows);
        let log = CapturingLog::new();
        let loader = RecordLoader::new(&log);

        let stats = loader
            .summarize(&mut dataset)
            .totals
            .expect("total column is present");

        let expected_sum: f64 = totals.iter().sum();
        prop_assert!((stats.sum - expected_sum).abs() < 1e-6);
        prop_assert!((stats.mean - expected_sum / totals.len() as f64).abs() < 1e-6);
        prop_assert_eq!(stats.count, totals.len());
    }

    #[test]
    fn prop_columns_missing_is_the_set_difference(
        mask in prop::collection::vec(any::<bool>(), 8)
    ) {
        let present: Vec<&str> = EXPECTED_COLUMNS
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(column, _)| *column)
            .collect();
        let dataset = dataset_from_rows(&present, vec![]);
        let log = CapturingLog::new();
        let loader = RecordLoader::new(&log);

        let report = loader.validate(&dataset, &EXPECTED_COLUMNS);

        let expected_missing: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| !**keep)
            .map(|(column, _)| column.to_string())
            .collect();
        prop_assert_eq!(report.columns_missing, expected_missing);
        prop_assert_eq!(report.is_valid, mask.iter().all(|keep| *keep));
    }

    #[test]
    fn prop_date_range_is_order_independent(
        days in prop::collection::vec(0i64..3650, 1..30)
    ) {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let rows: Vec<Vec<CellValue>> = days
            .iter()
            .map(|d| {
                let formatted = (base + Duration::days(*d)).format("%Y-%m-%d").to_string();
                vec![CellValue::Text(formatted)]
            })
            .collect();
        let mut dataset = dataset_from_rows(&["date"], rows);
        let log = CapturingLog::new();
        let loader = RecordLoader::new(&log);

        let outcome = loader.summarize(&mut dataset).date_range;

        let expected_min = base + Duration::days(*days.iter().min().unwrap());
        let expected_max = base + Duration::days(*days.iter().max().unwrap());
        prop_assert_eq!(
            outcome,
            DateRangeOutcome::Range { min: expected_min, max: expected_max }
        );
    }
}
