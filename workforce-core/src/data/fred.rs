//! FRED data provider.
//!
//! Downloads the graph CSV export (`fredgraph.csv?id=...`), which needs no
//! API key. The export has a date column (`DATE` or `observation_date`,
//! depending on vintage) followed by one value column named after the series;
//! missing observations are written as `.`.

use super::http::{blocking_client, send_error};
use super::provider::{DataError, SeriesProvider};
use crate::domain::{DateRange, SeriesSpec, TimeSeriesTable};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::{debug, warn};

pub const FRED_GRAPH_CSV_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";

/// FRED graph-CSV provider.
pub struct FredProvider {
    client: Client,
    base_url: String,
}

impl FredProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(FRED_GRAPH_CSV_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: blocking_client()?,
            base_url: base_url.into(),
        })
    }

    /// Download URL for a series.
    pub fn series_url(&self, id: &str) -> String {
        format!("{}?id={id}", self.base_url)
    }
}

impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, series: &SeriesSpec, range: &DateRange) -> Result<TimeSeriesTable, DataError> {
        let url = self.series_url(&series.id);
        debug!(%url, "requesting FRED series");

        let resp = self.client.get(&url).send().map_err(|e| send_error(&url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                series: series.id.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to read body for {}: {e}", series.id))
        })?;

        let table = parse_fredgraph_csv(&body, series)?.between(range.start, range.end);
        if table.is_empty() {
            warn!(series = %series.id, "no observations in requested range");
        }
        Ok(table)
    }
}

/// Parse a `fredgraph.csv` body into a single-column table named `series.name`.
pub fn parse_fredgraph_csv(body: &str, series: &SeriesSpec) -> Result<TimeSeriesTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::ResponseFormatChanged(format!("unreadable header: {e}")))?;
    if headers.len() < 2 {
        return Err(DataError::ResponseFormatChanged(format!(
            "expected a date and a value column for {}, got {} column(s)",
            series.id,
            headers.len()
        )));
    }

    let mut observations = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| DataError::ResponseFormatChanged(format!("line {}: {e}", line + 2)))?;

        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
            DataError::ResponseFormatChanged(format!("bad date '{raw_date}' on line {}", line + 2))
        })?;

        let raw_value = record.get(1).unwrap_or_default();
        let value = parse_observation(raw_value).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!(
                "bad value '{raw_value}' on line {}",
                line + 2
            ))
        })?;

        observations.push((date, value));
    }

    Ok(TimeSeriesTable::from_observations(series.name.clone(), observations))
}

/// `.` and empty cells are missing observations.
fn parse_observation(raw: &str) -> Option<f64> {
    match raw {
        "" | "." => Some(f64::NAN),
        _ => raw.parse().ok(),
    }
}
