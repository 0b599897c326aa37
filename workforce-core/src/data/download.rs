//! Download orchestrator: fetches a batch of series and persists each one.

use super::provider::{DataError, DownloadProgress, SeriesProvider};
use super::store::SeriesStore;
use crate::domain::{DateRange, SeriesSpec, TimeSeriesTable};
use std::path::PathBuf;
use tracing::{info, warn};

/// A series that was fetched and written.
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub spec: SeriesSpec,
    pub table: TimeSeriesTable,
    pub path: PathBuf,
}

/// Summary of a batch download operation.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fetched: Vec<FetchedSeries>,
    pub errors: Vec<(SeriesSpec, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// The fetched table for a series name, if that download succeeded.
    pub fn table_for(&self, name: &str) -> Option<&TimeSeriesTable> {
        self.fetched
            .iter()
            .find(|f| f.spec.name == name)
            .map(|f| &f.table)
    }
}

/// Download every series in order, writing each to
/// `{store}/{provider}_{ID}_{Name}.csv`.
///
/// Each series is independent: a failure is recorded and the batch moves on.
/// A failed series leaves no file behind.
pub fn download_series(
    provider: &dyn SeriesProvider,
    store: &SeriesStore,
    series: &[SeriesSpec],
    range: &DateRange,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = series.len();
    let mut fetched = Vec::new();
    let mut errors = Vec::new();

    for (i, spec) in series.iter().enumerate() {
        progress.on_start(spec, i, total);

        let result = download_single(provider, store, spec, range);
        let report = result
            .as_ref()
            .map(|(table, path)| (table.len(), path.clone()))
            .map_err(DataError::clone);
        progress.on_complete(spec, i, total, &report);

        match result {
            Ok((table, path)) => {
                info!(
                    provider = provider.name(),
                    series = %spec.id,
                    rows = table.len(),
                    path = %path.display(),
                    "series saved"
                );
                fetched.push(FetchedSeries {
                    spec: spec.clone(),
                    table,
                    path,
                });
            }
            Err(e) => {
                warn!(provider = provider.name(), series = %spec.id, error = %e, "series failed");
                errors.push((spec.clone(), e));
            }
        }
    }

    let succeeded = fetched.len();
    let failed = errors.len();
    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        fetched,
        errors,
    }
}

/// Fetch then persist one series.
fn download_single(
    provider: &dyn SeriesProvider,
    store: &SeriesStore,
    spec: &SeriesSpec,
    range: &DateRange,
) -> Result<(TimeSeriesTable, PathBuf), DataError> {
    let table = provider.fetch(spec, range)?;
    let path = store.write_series(provider.name(), spec, &table)?;
    Ok((table, path))
}
