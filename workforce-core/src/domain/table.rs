//! Date-keyed numeric tables.
//!
//! A `TimeSeriesTable` is column-oriented: one shared date axis and any number
//! of named `f64` columns of the same length. Dates are strictly ascending,
//! which every constructor enforces. Missing observations are `NaN`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Structural errors raised while building or reading a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("missing field '{0}'")]
    MissingColumn(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{name}' has {actual} values but the table has {expected} dates")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("dates must be strictly ascending ({prev} followed by {next})")]
    Unordered { prev: NaiveDate, next: NaiveDate },

    #[error("row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// One named numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An ordered sequence of dated records with named numeric fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl TimeSeriesTable {
    /// Build a table from an already-sorted date axis and its columns.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self, TableError> {
        for pair in dates.windows(2) {
            if pair[0] >= pair[1] {
                return Err(TableError::Unordered {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
            if column.values.len() != dates.len() {
                return Err(TableError::LengthMismatch {
                    name: column.name.clone(),
                    expected: dates.len(),
                    actual: column.values.len(),
                });
            }
        }

        Ok(Self { dates, columns })
    }

    /// Build a single-column table from unordered observations.
    ///
    /// Observations are sorted by date; when a date repeats, the first
    /// occurrence wins.
    pub fn from_observations(
        name: impl Into<String>,
        mut observations: Vec<(NaiveDate, f64)>,
    ) -> Self {
        observations.sort_by_key(|(date, _)| *date);
        observations.dedup_by_key(|(date, _)| *date);

        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = observations.into_iter().unzip();
        Self {
            dates,
            columns: vec![Column::new(name, values)],
        }
    }

    /// Build a table from unordered rows, sorting and de-duplicating by date.
    pub fn from_rows(
        names: Vec<String>,
        mut rows: Vec<(NaiveDate, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        for (i, (_, values)) in rows.iter().enumerate() {
            if values.len() != names.len() {
                return Err(TableError::RowWidth {
                    row: i,
                    expected: names.len(),
                    actual: values.len(),
                });
            }
        }

        rows.sort_by_key(|(date, _)| *date);
        rows.dedup_by_key(|(date, _)| *date);

        let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(j, name)| Column::new(name, rows.iter().map(|(_, values)| values[j]).collect()))
            .collect();

        Self::new(dates, columns)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of value columns (the date key is not counted).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Result<&[f64], TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Append a column, consuming the table.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if values.len() != self.dates.len() {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.dates.len(),
                actual: values.len(),
            });
        }
        self.columns.push(Column::new(name, values));
        Ok(self)
    }

    /// Project onto the named columns, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<Self, TableError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let values = self.column(name)?;
            columns.push(Column::new(*name, values.to_vec()));
        }
        Self::new(self.dates.clone(), columns)
    }

    /// Rename a column in place.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), TableError> {
        if from != to && self.has_column(to) {
            return Err(TableError::DuplicateColumn(to.to_string()));
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == from)
            .ok_or_else(|| TableError::MissingColumn(from.to_string()))?;
        column.name = to.to_string();
        Ok(())
    }

    /// Keep the rows whose date satisfies `keep`.
    pub fn filter_dates(&self, keep: impl Fn(NaiveDate) -> bool) -> Self {
        let indices: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, date)| keep(**date))
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&indices)
    }

    /// Rows with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filter_dates(|d| d >= start && d <= end)
    }

    /// Index of the row for `date`, if present.
    pub fn row_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Value of `name` at row `row`.
    pub fn value_at(&self, row: usize, name: &str) -> Result<f64, TableError> {
        let values = self.column(name)?;
        Ok(values.get(row).copied().unwrap_or(f64::NAN))
    }

    /// Date of the last row.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Build a new table from the given row indices (must be ascending).
    pub(crate) fn take_rows(&self, indices: &[usize]) -> Self {
        let dates = indices.iter().map(|&i| self.dates[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), indices.iter().map(|&i| c.values[i]).collect()))
            .collect();
        Self { dates, columns }
    }
}
