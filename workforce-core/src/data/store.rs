//! Flat-file persistence for tables.
//!
//! Layout: every file lives directly in the data directory.
//! - Downloaded series: `{dir}/{source}_{SERIES_ID}_{Name}.csv`
//! - Pipeline outputs: fixed logical names chosen by the caller
//!
//! Time-series files have a leading `Date` column (ISO dates) followed by one
//! column per field. `NaN` is written as an empty cell and read back as `NaN`.
//! Writes overwrite the whole file.

use super::provider::DataError;
use super::scrape::HtmlTable;
use crate::domain::{SeriesSpec, TimeSeriesTable};
use crate::pipeline::AnnualAverages;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATE_COLUMN: &str = "Date";
pub const YEAR_COLUMN: &str = "Year";

/// The working directory holding downloaded and derived tables.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<(), DataError> {
        fs::create_dir_all(&self.dir).map_err(|e| DataError::io(&self.dir, e))
    }

    /// Deterministic path for a downloaded series.
    pub fn series_path(&self, source: &str, series: &SeriesSpec) -> PathBuf {
        self.dir
            .join(format!("{source}_{}_{}.csv", series.id, series.name))
    }

    /// Path for a named artifact inside the data directory.
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn write_series(
        &self,
        source: &str,
        series: &SeriesSpec,
        table: &TimeSeriesTable,
    ) -> Result<PathBuf, DataError> {
        self.ensure_dir()?;
        let path = self.series_path(source, series);
        write_table(&path, table)?;
        Ok(path)
    }

    /// Load a previously downloaded series. A missing file is `MissingFile`.
    pub fn load_series(&self, source: &str, series: &SeriesSpec) -> Result<TimeSeriesTable, DataError> {
        let path = self.series_path(source, series);
        let table = read_table(&path)?;
        if !table.has_column(&series.name) {
            return Err(DataError::Csv {
                path,
                reason: format!("expected a '{}' column", series.name),
            });
        }
        Ok(table)
    }
}

/// Format one cell: shortest round-trip representation; `NaN` and the
/// infinities are written as an empty cell.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else {
        raw.parse().ok()
    }
}

/// Serialize a table as CSV into any writer.
pub fn write_table_csv<W: Write>(writer: W, table: &TimeSeriesTable) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.width() + 1);
    header.push(DATE_COLUMN);
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    for (i, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(table.width() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(table.columns().iter().map(|c| format_value(c.values[i])));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_table(path: &Path, table: &TimeSeriesTable) -> Result<(), DataError> {
    let file = fs::File::create(path).map_err(|e| DataError::io(path, e))?;
    write_table_csv(file, table).map_err(|e| DataError::csv(path, e))?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

/// Read a time-series CSV. The first column is the date key whatever its
/// header says; every other column must be numeric.
pub fn read_table(path: &Path) -> Result<TimeSeriesTable, DataError> {
    if !path.exists() {
        return Err(DataError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| DataError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| DataError::csv(path, e))?.clone();
    if headers.is_empty() {
        return Err(DataError::Csv {
            path: path.to_path_buf(),
            reason: "empty header".into(),
        });
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataError::csv(path, e))?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| DataError::Csv {
            path: path.to_path_buf(),
            reason: format!("bad date '{raw_date}' on line {}", line + 2),
        })?;

        let mut values = Vec::with_capacity(names.len());
        for raw in record.iter().skip(1) {
            values.push(parse_value(raw).ok_or_else(|| DataError::Csv {
                path: path.to_path_buf(),
                reason: format!("bad value '{raw}' on line {}", line + 2),
            })?);
        }
        rows.push((date, values));
    }

    Ok(TimeSeriesTable::from_rows(names, rows)?)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Serialize annual averages as CSV with a leading `Year` column.
pub fn write_annual_csv<W: Write>(writer: W, annual: &AnnualAverages) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(annual.columns().len() + 1);
    header.push(YEAR_COLUMN);
    header.extend(annual.columns().iter().map(|c| c.name.as_str()));
    wtr.write_record(&header)?;

    for (i, year) in annual.years().iter().enumerate() {
        let mut record = Vec::with_capacity(annual.columns().len() + 1);
        record.push(year.to_string());
        record.extend(annual.columns().iter().map(|c| format_value(c.values[i])));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_annual(path: &Path, annual: &AnnualAverages) -> Result<(), DataError> {
    let file = fs::File::create(path).map_err(|e| DataError::io(path, e))?;
    write_annual_csv(file, annual).map_err(|e| DataError::csv(path, e))
}

/// Write a scraped HTML table as CSV. Rows may be ragged.
pub fn write_html_table(path: &Path, table: &HtmlTable) -> Result<(), DataError> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::csv(path, e))?;
    if !table.headers.is_empty() {
        wtr.write_record(&table.headers)
            .map_err(|e| DataError::csv(path, e))?;
    }
    for row in &table.rows {
        wtr.write_record(row).map_err(|e| DataError::csv(path, e))?;
    }
    wtr.flush().map_err(|e| DataError::io(path, e))
}
