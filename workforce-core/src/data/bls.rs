//! BLS public time-series API (v2) provider.
//!
//! One POST carries several series and a year range. Without a registration
//! key the API allows 25 queries a day, 10 years and 25 series per query;
//! with a key, 500 queries, 20 years and 50 series. Requests outside those
//! limits are rejected here before any network I/O.

use super::http::{blocking_client, send_error};
use super::provider::{DataError, SeriesProvider};
use crate::domain::{DateRange, SeriesSpec, TimeSeriesTable};
use chrono::{Datelike, NaiveDate, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

pub const BLS_API_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";

/// Per-key quota and request-shape limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlsLimits {
    pub daily_queries: u32,
    pub max_year_span: u32,
    pub max_series_per_query: usize,
}

impl BlsLimits {
    pub const UNREGISTERED: Self = Self {
        daily_queries: 25,
        max_year_span: 10,
        max_series_per_query: 25,
    };

    pub const REGISTERED: Self = Self {
        daily_queries: 500,
        max_year_span: 20,
        max_series_per_query: 50,
    };

    pub fn for_key(api_key: Option<&str>) -> Self {
        match api_key {
            Some(key) if !key.trim().is_empty() => Self::REGISTERED,
            _ => Self::UNREGISTERED,
        }
    }
}

#[derive(Debug, Serialize)]
struct BlsRequest<'a> {
    seriesid: Vec<&'a str>,
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BlsResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results")]
    results: Option<BlsResults>,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    #[serde(default)]
    series: Vec<BlsSeriesPayload>,
}

#[derive(Debug, Deserialize)]
struct BlsSeriesPayload {
    #[serde(rename = "seriesID")]
    series_id: String,
    #[serde(default)]
    data: Vec<BlsDataPoint>,
}

#[derive(Debug, Deserialize)]
struct BlsDataPoint {
    year: String,
    period: String,
    value: String,
    #[serde(default)]
    footnotes: Vec<BlsFootnote>,
}

#[derive(Debug, Deserialize)]
struct BlsFootnote {
    text: Option<String>,
}

/// One observation in the API's long format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlsObservation {
    pub series_id: String,
    pub year: i32,
    pub period: String,
    pub value: f64,
    pub footnotes: Vec<String>,
}

impl BlsObservation {
    /// Calendar date for this observation's period, if it has one.
    pub fn date(&self) -> Option<NaiveDate> {
        period_date(self.year, &self.period)
    }
}

/// BLS API provider.
pub struct BlsProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BlsProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, DataError> {
        Self::with_base_url(BLS_API_URL, api_key)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            client: blocking_client()?,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn limits(&self) -> BlsLimits {
        BlsLimits::for_key(self.api_key.as_deref())
    }

    /// Validate a request against the key's limits.
    pub fn check_request(
        &self,
        series_count: usize,
        start_year: i32,
        end_year: i32,
    ) -> Result<(), DataError> {
        let limits = self.limits();
        if series_count == 0 {
            return Err(DataError::RequestRejected("no series requested".into()));
        }
        if series_count > limits.max_series_per_query {
            return Err(DataError::TooManySeries {
                requested: series_count,
                limit: limits.max_series_per_query,
            });
        }
        if end_year < start_year {
            return Err(DataError::RequestRejected(format!(
                "end year {end_year} precedes start year {start_year}"
            )));
        }
        let span = (end_year - start_year + 1) as u32;
        if span > limits.max_year_span {
            return Err(DataError::YearSpanExceeded {
                requested: span,
                limit: limits.max_year_span,
            });
        }
        Ok(())
    }

    /// Fetch every observation for the given series in one request.
    pub fn fetch_observations(
        &self,
        series_ids: &[&str],
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<BlsObservation>, DataError> {
        self.check_request(series_ids.len(), start_year, end_year)?;

        let request = BlsRequest {
            seriesid: series_ids.to_vec(),
            startyear: start_year.to_string(),
            endyear: end_year.to_string(),
            registrationkey: self.api_key.as_deref(),
        };
        debug!(series = ?series_ids, start_year, end_year, "posting BLS request");

        let resp = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .map_err(|e| send_error(&self.base_url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                series: series_ids.join(","),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| DataError::ResponseFormatChanged(format!("failed to read body: {e}")))?;
        let observations = parse_bls_response(&body)?;
        info!(count = observations.len(), "BLS observations received");
        Ok(observations)
    }
}

impl SeriesProvider for BlsProvider {
    fn name(&self) -> &str {
        "bls"
    }

    fn fetch(&self, series: &SeriesSpec, range: &DateRange) -> Result<TimeSeriesTable, DataError> {
        let (start_year, end_year) = request_years(range, Utc::now().year());
        let observations = self.fetch_observations(&[series.id.as_str()], start_year, end_year)?;
        Ok(observations_to_table(&observations, series).between(range.start, range.end))
    }
}

/// Year bounds of a request for `range`. An open-ended range stops at
/// `current_year`.
pub fn request_years(range: &DateRange, current_year: i32) -> (i32, i32) {
    let end_year = range.end_year().min(current_year).max(range.start_year());
    (range.start_year(), end_year)
}

/// Parse an API response body into long-format observations.
pub fn parse_bls_response(body: &str) -> Result<Vec<BlsObservation>, DataError> {
    let resp: BlsResponse = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("invalid BLS JSON: {e}")))?;

    if resp.status != "REQUEST_SUCCEEDED" {
        return Err(DataError::RequestRejected(format!(
            "{}: {}",
            resp.status,
            resp.message.join("; ")
        )));
    }
    for message in &resp.message {
        warn!(%message, "BLS API message");
    }

    let results = resp
        .results
        .ok_or_else(|| DataError::ResponseFormatChanged("response has no Results".into()))?;

    let mut observations = Vec::new();
    for series in results.series {
        for point in series.data {
            let year = point.year.trim().parse::<i32>().map_err(|_| {
                DataError::ResponseFormatChanged(format!(
                    "bad year '{}' in {}",
                    point.year, series.series_id
                ))
            })?;
            let value = parse_value(&point.value).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!(
                    "bad value '{}' in {}",
                    point.value, series.series_id
                ))
            })?;
            let footnotes = point
                .footnotes
                .into_iter()
                .filter_map(|f| f.text)
                .filter(|t| !t.is_empty())
                .collect();

            observations.push(BlsObservation {
                series_id: series.series_id.clone(),
                year,
                period: point.period,
                value,
                footnotes,
            });
        }
    }
    Ok(observations)
}

/// `-` marks an unavailable value; thousands separators are tolerated.
fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw {
        "" | "-" => Some(f64::NAN),
        _ => raw.replace(',', "").parse().ok(),
    }
}

/// Map a BLS period code to the first day of the period.
///
/// `M01`–`M12` are months, `Q01`–`Q04` quarters, `A01` the annual figure.
/// `M13` (annual average of monthly data) and unknown codes have no date.
pub fn period_date(year: i32, period: &str) -> Option<NaiveDate> {
    let kind = period.get(..1)?;
    let num: u32 = period.get(1..)?.parse().ok()?;
    let month = match kind {
        "M" if (1..=12).contains(&num) => num,
        "Q" if (1..=4).contains(&num) => (num - 1) * 3 + 1,
        "A" if num == 1 => 1,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Build a single-column table for one series from long-format observations.
pub fn observations_to_table(observations: &[BlsObservation], series: &SeriesSpec) -> TimeSeriesTable {
    let points = observations
        .iter()
        .filter(|o| o.series_id == series.id)
        .filter_map(|o| o.date().map(|date| (date, o.value)))
        .collect();
    TimeSeriesTable::from_observations(series.name.clone(), points)
}

/// Write long-format observations as CSV (`series_id,year,period,value,footnotes`).
pub fn write_observations_csv(path: &Path, observations: &[BlsObservation]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DataError::csv(path, e))?;
    writer
        .write_record(["series_id", "year", "period", "value", "footnotes"])
        .map_err(|e| DataError::csv(path, e))?;
    for o in observations {
        writer
            .write_record([
                o.series_id.clone(),
                o.year.to_string(),
                o.period.clone(),
                super::store::format_value(o.value),
                o.footnotes.join("; "),
            ])
            .map_err(|e| DataError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))
}
