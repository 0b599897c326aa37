//! Date alignment of several series tables.
//!
//! Unlike a union alignment, the merge here is an inner join: a row survives
//! only when its date is present in every input. Nothing is filled.

use super::PipelineError;
use crate::domain::{TableError, TimeSeriesTable};
use tracing::debug;

/// Inner join two tables on date. Columns are left's followed by right's.
pub fn inner_join(
    left: &TimeSeriesTable,
    right: &TimeSeriesTable,
) -> Result<TimeSeriesTable, PipelineError> {
    if let Some(dup) = right.column_names().find(|name| left.has_column(name)) {
        return Err(TableError::DuplicateColumn(dup.to_string()).into());
    }

    // Both date axes are strictly ascending, so one forward pass finds the
    // intersection.
    let (ld, rd) = (left.dates(), right.dates());
    let mut left_rows = Vec::new();
    let mut right_rows = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < ld.len() && j < rd.len() {
        match ld[i].cmp(&rd[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                left_rows.push(i);
                right_rows.push(j);
                i += 1;
                j += 1;
            }
        }
    }

    let left = left.take_rows(&left_rows);
    let right = right.take_rows(&right_rows);
    let mut columns = left.columns().to_vec();
    columns.extend_from_slice(right.columns());

    Ok(TimeSeriesTable::new(left.dates().to_vec(), columns)?)
}

/// Fold-left inner join of every table, keeping input column order.
pub fn merge_all(tables: &[TimeSeriesTable]) -> Result<TimeSeriesTable, PipelineError> {
    let (first, rest) = tables.split_first().ok_or(PipelineError::NoInputs)?;

    let mut merged = first.clone();
    for table in rest {
        merged = inner_join(&merged, table)?;
    }

    debug!(
        inputs = tables.len(),
        rows = merged.len(),
        columns = merged.width(),
        "merged tables"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(name: &str, obs: &[(&str, f64)]) -> TimeSeriesTable {
        TimeSeriesTable::from_observations(
            name,
            obs.iter().map(|(date, v)| (d(date), *v)).collect(),
        )
    }

    #[test]
    fn keeps_only_common_dates() {
        let a = series("A", &[("2020-01-01", 1.0), ("2020-02-01", 2.0), ("2020-03-01", 3.0)]);
        let b = series("B", &[("2020-01-01", 10.0), ("2020-03-01", 30.0), ("2020-04-01", 40.0)]);

        let merged = inner_join(&a, &b).unwrap();
        assert_eq!(merged.dates(), &[d("2020-01-01"), d("2020-03-01")]);
        assert_eq!(merged.column("A").unwrap(), &[1.0, 3.0]);
        assert_eq!(merged.column("B").unwrap(), &[10.0, 30.0]);
    }

    #[test]
    fn merge_all_preserves_input_column_order() {
        let a = series("Total", &[("2020-01-01", 1.0)]);
        let b = series("Subset", &[("2020-01-01", 2.0)]);
        let c = series("Rate", &[("2020-01-01", 3.0)]);

        let merged = merge_all(&[a, b, c]).unwrap();
        let names: Vec<&str> = merged.column_names().collect();
        assert_eq!(names, vec!["Total", "Subset", "Rate"]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(merge_all(&[]).unwrap_err(), PipelineError::NoInputs);
    }

    #[test]
    fn duplicate_column_is_an_error() {
        let a = series("A", &[("2020-01-01", 1.0)]);
        let err = inner_join(&a, &a.clone()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Table(TableError::DuplicateColumn("A".into()))
        );
    }

    #[test]
    fn disjoint_dates_give_an_empty_table() {
        let a = series("A", &[("2020-01-01", 1.0)]);
        let b = series("B", &[("2021-01-01", 1.0)]);
        let merged = inner_join(&a, &b).unwrap();
        assert!(merged.is_empty());
        assert_eq!(merged.width(), 2);
    }
}
