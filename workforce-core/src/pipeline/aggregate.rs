//! Calendar-year means.

use super::PipelineError;
use crate::domain::{Column, TableError, TimeSeriesTable};
use chrono::Datelike;
use serde::Serialize;
use std::ops::RangeInclusive;

/// First and last calendar year kept by the annual summary.
pub const FIRST_YEAR: i32 = 2015;
pub const LAST_YEAR: i32 = 2024;

/// One row per calendar year, one mean per numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnualAverages {
    years: Vec<i32>,
    columns: Vec<Column>,
}

impl AnnualAverages {
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    /// Mean of `column` over `year`.
    pub fn value(&self, year: i32, column: &str) -> Result<f64, PipelineError> {
        let row = self
            .years
            .binary_search(&year)
            .map_err(|_| PipelineError::MissingYear(year))?;
        let column = self
            .columns
            .iter()
            .find(|c| c.name == column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        Ok(column.values[row])
    }
}

/// Group rows by calendar year and average every column, skipping `NaN`.
///
/// Only years inside `years` are kept. A year with no rows gets no record; a
/// column whose values are all `NaN` for a year averages to `NaN`.
pub fn annual_means(table: &TimeSeriesTable, years: RangeInclusive<i32>) -> AnnualAverages {
    // Dates are ascending, so each year is one contiguous run of rows.
    let mut groups: Vec<(i32, std::ops::Range<usize>)> = Vec::new();
    for (i, date) in table.dates().iter().enumerate() {
        let year = date.year();
        if let Some((last, rows)) = groups.last_mut() {
            if *last == year {
                rows.end = i + 1;
                continue;
            }
        }
        groups.push((year, i..i + 1));
    }
    groups.retain(|(year, _)| years.contains(year));

    let columns = table
        .columns()
        .iter()
        .map(|c| {
            let means = groups
                .iter()
                .map(|(_, rows)| nan_mean(&c.values[rows.clone()]))
                .collect();
            Column::new(c.name.clone(), means)
        })
        .collect();

    AnnualAverages {
        years: groups.into_iter().map(|(year, _)| year).collect(),
        columns,
    }
}

fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Percentage change of `column` between two annual rows:
/// `((later / earlier) - 1) * 100`.
pub fn growth_pct(
    annual: &AnnualAverages,
    column: &str,
    from_year: i32,
    to_year: i32,
) -> Result<f64, PipelineError> {
    let earlier = annual.value(from_year, column)?;
    let later = annual.value(to_year, column)?;
    Ok((later / earlier - 1.0) * 100.0)
}
