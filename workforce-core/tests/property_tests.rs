//! Property tests for pipeline invariants.
//!
//! 1. Merge row count equals the size of the common date intersection
//! 2. Residuals are exact differences
//! 3. One annual row per year present in range, none for empty years

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeSet;
use workforce_core::pipeline::{annual_means, inner_join, merge_all};
use workforce_core::TimeSeriesTable;

// ── Strategies ───────────────────────────────────────────────────────

/// A set of month starts between 2013 and 2026.
fn arb_months() -> impl Strategy<Value = BTreeSet<NaiveDate>> {
    prop::collection::btree_set((2013..=2026i32, 1..=12u32), 0..60).prop_map(|set| {
        set.into_iter()
            .map(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1).unwrap())
            .collect()
    })
}

fn arb_level() -> impl Strategy<Value = f64> {
    (0.0..200_000.0_f64).prop_map(|v| v.round())
}

fn table(name: &str, dates: &BTreeSet<NaiveDate>, value: f64) -> TimeSeriesTable {
    TimeSeriesTable::from_observations(name, dates.iter().map(|d| (*d, value)).collect())
}

// ── 1. Merge intersection ────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_rows_equal_date_intersection(a in arb_months(), b in arb_months(), c in arb_months()) {
        let merged = merge_all(&[
            table("A", &a, 1.0),
            table("B", &b, 2.0),
            table("C", &c, 3.0),
        ]).unwrap();

        let common: Vec<NaiveDate> = a
            .iter()
            .filter(|d| b.contains(*d) && c.contains(*d))
            .copied()
            .collect();
        prop_assert_eq!(merged.dates(), common.as_slice());
        prop_assert_eq!(merged.width(), 3);
    }

    #[test]
    fn join_is_symmetric_in_dates(a in arb_months(), b in arb_months()) {
        let ab = inner_join(&table("A", &a, 1.0), &table("B", &b, 2.0)).unwrap();
        let ba = inner_join(&table("B", &b, 2.0), &table("A", &a, 1.0)).unwrap();
        prop_assert_eq!(ab.dates(), ba.dates());
    }
}

// ── 2. Residual exactness ────────────────────────────────────────────

proptest! {
    #[test]
    fn residual_is_exact(total in arb_level(), subset in arb_level()) {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let merged = merge_all(&[
            TimeSeriesTable::from_observations("Total", vec![(d, total)]),
            TimeSeriesTable::from_observations("Subset", vec![(d, subset)]),
        ]).unwrap();

        let residual = merged.value_at(0, "Total").unwrap() - merged.value_at(0, "Subset").unwrap();
        prop_assert_eq!(residual, total - subset);
        prop_assert_eq!(residual + subset, total);
    }
}

// ── 3. Annual rows ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn one_annual_row_per_year_present(months in arb_months()) {
        let annual = annual_means(&table("X", &months, 5.0), 2015..=2024);

        let expected: Vec<i32> = months
            .iter()
            .map(|d| d.year())
            .filter(|y| (2015..=2024).contains(y))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(annual.years(), expected.as_slice());
        for year in annual.years() {
            prop_assert_eq!(annual.value(*year, "X").unwrap(), 5.0);
        }
    }
}
