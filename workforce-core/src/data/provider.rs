//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over data sources (FRED graph CSV, the
//! BLS time-series API) so the download orchestrator and the pipeline driver
//! can be exercised with in-memory providers in tests.

use crate::domain::{DateRange, SeriesSpec, TableError, TimeSeriesTable};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structured error types for data operations.
///
/// Displayed verbatim in console progress and in the run manifest.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {series}")]
    HttpStatus { series: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("request rejected by provider: {0}")]
    RequestRejected(String),

    #[error("year span {requested} exceeds the {limit}-year limit per query")]
    YearSpanExceeded { requested: u32, limit: u32 },

    #[error("{requested} series exceeds the limit of {limit} per query")]
    TooManySeries { requested: usize, limit: usize },

    #[error("missing input file {} (run the download step first)", path.display())]
    MissingFile { path: PathBuf },

    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("CSV error in {}: {reason}", path.display())]
    Csv { path: PathBuf, reason: String },

    #[error("table error: {0}")]
    Table(#[from] TableError),
}

impl DataError {
    pub(crate) fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        DataError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn csv(path: &Path, err: impl std::fmt::Display) -> Self {
        DataError::Csv {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

/// Trait for series providers (FRED, BLS).
///
/// Implementations handle the specifics of fetching one series from one
/// source. Persistence sits above this trait in `download_series`.
pub trait SeriesProvider: Send + Sync {
    /// Short provider name; also the prefix of persisted file names.
    fn name(&self) -> &str;

    /// Fetch one series over a date range. The returned table has a single
    /// column named `series.name`.
    fn fetch(&self, series: &SeriesSpec, range: &DateRange) -> Result<TimeSeriesTable, DataError>;
}

/// Progress callback for multi-series downloads.
pub trait DownloadProgress {
    fn on_start(&self, series: &SeriesSpec, index: usize, total: usize);

    fn on_complete(
        &self,
        series: &SeriesSpec,
        index: usize,
        total: usize,
        result: &Result<(usize, PathBuf), DataError>,
    );

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, series: &SeriesSpec, index: usize, total: usize) {
        println!("[{}/{}] {}...", index + 1, total, series.name);
        println!("     Series ID: {}", series.id);
    }

    fn on_complete(
        &self,
        _series: &SeriesSpec,
        _index: usize,
        _total: usize,
        result: &Result<(usize, PathBuf), DataError>,
    ) {
        match result {
            Ok((rows, path)) => {
                println!("     OK: downloaded {rows} records");
                println!("     OK: saved to {}", path.display());
            }
            Err(e) => println!("     FAIL: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that discards every event.
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn on_start(&self, _series: &SeriesSpec, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _series: &SeriesSpec,
        _index: usize,
        _total: usize,
        _result: &Result<(usize, PathBuf), DataError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
