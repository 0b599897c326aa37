//! Download commands: FRED series, BLS API series, release-table scraping.
//!
//! Each returns a `RunReport`; individual series or table failures are
//! recorded as failed steps and never abort the batch.

use std::path::PathBuf;
use tracing::warn;

use workforce_core::data::bls::{observations_to_table, write_observations_csv};
use workforce_core::data::scrape::{HtmlTable, RELEASE_TABLES};
use workforce_core::data::store::write_html_table;
use workforce_core::data::{
    download_series, BlsProvider, DownloadProgress, ReleaseScraper, SeriesProvider,
};
use workforce_core::domain::KnownSeries;
use workforce_core::{DateRange, SeriesSpec};

use crate::config::WorkforceConfig;
use crate::native_born::RunError;
use crate::report::{RunReport, StepOutcome};

/// Download FRED (or any provider's) series into the data directory.
pub fn run_series_download(
    config: &WorkforceConfig,
    provider: &dyn SeriesProvider,
    series: &[SeriesSpec],
    range: &DateRange,
    progress: &dyn DownloadProgress,
) -> Result<RunReport, RunError> {
    let store = config.store();
    store.ensure_dir()?;
    let mut report = RunReport::new(provider.name());

    let summary = download_series(provider, &store, series, range, progress);
    for fetched in summary.fetched {
        report.record(StepOutcome::succeeded(
            fetched.spec.to_string(),
            format!("{} records", fetched.table.len()),
        ));
        report.add_artifact(fetched.path);
    }
    for (spec, err) in &summary.errors {
        report.record(StepOutcome::failed(spec.to_string(), err));
    }
    Ok(report)
}

/// One BLS API request for several series.
///
/// The long-format observations go to `output` (default
/// `bls_api_data_{start}_{end}.csv`); each series is also saved as a
/// `bls_{ID}_{Name}.csv` time-series file.
pub fn run_bls_download(
    config: &WorkforceConfig,
    provider: &BlsProvider,
    series_ids: &[String],
    start_year: i32,
    end_year: i32,
    output: Option<PathBuf>,
) -> Result<RunReport, RunError> {
    let store = config.store();
    store.ensure_dir()?;
    let mut report = RunReport::new("bls");

    // Shape errors are the caller's to fix; nothing is sent.
    provider.check_request(series_ids.len(), start_year, end_year)?;

    let ids: Vec<&str> = series_ids.iter().map(String::as_str).collect();
    let observations = match provider.fetch_observations(&ids, start_year, end_year) {
        Ok(obs) => obs,
        Err(e) => {
            report.record(StepOutcome::failed("BLS request", &e));
            return Ok(report);
        }
    };
    report.record(StepOutcome::succeeded(
        "BLS request",
        format!("{} observations", observations.len()),
    ));

    let output = output.unwrap_or_else(|| {
        store.artifact_path(&format!("bls_api_data_{start_year}_{end_year}.csv"))
    });
    match write_observations_csv(&output, &observations) {
        Ok(()) => report.add_artifact(output),
        Err(e) => report.record(StepOutcome::failed("write observations", &e)),
    }

    for id in series_ids {
        let spec = KnownSeries::lookup(id)
            .map(|k| k.spec())
            .unwrap_or_else(|| SeriesSpec::new(id.as_str(), id.as_str()));
        let table = observations_to_table(&observations, &spec);
        if table.is_empty() {
            warn!(series = %id, "no dated observations returned");
            report.record(StepOutcome::failed(
                spec.to_string(),
                &"no dated observations returned",
            ));
            continue;
        }
        match store.write_series(provider.name(), &spec, &table) {
            Ok(path) => {
                report.record(StepOutcome::succeeded(
                    spec.to_string(),
                    format!("{} records", table.len()),
                ));
                report.add_artifact(path);
            }
            Err(e) => report.record(StepOutcome::failed(spec.to_string(), &e)),
        }
    }
    Ok(report)
}

/// Scrape the numbered release tables, and optionally every table on the
/// release summary page.
pub fn run_release_scrape(
    config: &WorkforceConfig,
    scraper: &ReleaseScraper,
    include_release_page: bool,
) -> Result<RunReport, RunError> {
    let store = config.store();
    store.ensure_dir()?;
    let mut report = RunReport::new("scrape");

    for outcome in scraper.scrape_release_tables(&RELEASE_TABLES) {
        let step = format!("table {} ({})", outcome.number, outcome.description);
        match outcome.result {
            Ok(table) => {
                let path = store.artifact_path(&format!("bls_forbrn_table_{:02}.csv", outcome.number));
                save_html_table(&mut report, step, path, &table);
            }
            Err(e) => report.record(StepOutcome::failed(step, &e)),
        }
    }

    if include_release_page {
        std::thread::sleep(config.scrape_delay());
        match scraper.scrape_release_page() {
            Ok(tables) if tables.is_empty() => {
                report.record(StepOutcome::failed("release page", &"no tables found"));
            }
            Ok(tables) => {
                for (i, table) in tables.iter().enumerate() {
                    let path = store.artifact_path(&format!("bls_forbrn_main_table_{}.csv", i + 1));
                    save_html_table(&mut report, format!("release page table {}", i + 1), path, table);
                }
            }
            Err(e) => report.record(StepOutcome::failed("release page", &e)),
        }
    }
    Ok(report)
}

fn save_html_table(report: &mut RunReport, step: String, path: PathBuf, table: &HtmlTable) {
    match write_html_table(&path, table) {
        Ok(()) => {
            report.record(StepOutcome::succeeded(
                step,
                format!("{} rows x {} columns", table.rows.len(), table.headers.len()),
            ));
            report.add_artifact(path);
        }
        Err(e) => report.record(StepOutcome::failed(step, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workforce_core::data::{DataError, NoProgress};
    use workforce_core::TimeSeriesTable;
    use chrono::NaiveDate;

    struct FixedProvider;

    impl SeriesProvider for FixedProvider {
        fn name(&self) -> &str {
            "fred"
        }

        fn fetch(&self, series: &SeriesSpec, range: &DateRange) -> Result<TimeSeriesTable, DataError> {
            if series.id == "BAD" {
                return Err(DataError::HttpStatus {
                    series: series.id.clone(),
                    status: 404,
                });
            }
            let obs = vec![
                (NaiveDate::from_ymd_opt(2014, 12, 1).unwrap(), 1.0),
                (NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(), 2.0),
            ];
            Ok(TimeSeriesTable::from_observations(series.name.clone(), obs)
                .between(range.start, range.end))
        }
    }

    fn config_in(dir: &std::path::Path) -> WorkforceConfig {
        WorkforceConfig {
            data_dir: dir.to_path_buf(),
            ..WorkforceConfig::default()
        }
    }

    #[test]
    fn series_download_records_each_series() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let series = vec![
            SeriesSpec::parse("CLF16OV"),
            SeriesSpec::parse("BAD=Broken"),
        ];

        let report = run_series_download(
            &config,
            &FixedProvider,
            &series,
            &config.fred_range(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(
            report.artifacts[0],
            dir.path().join("fred_CLF16OV_Total_US_Labor_Force.csv")
        );
        assert_eq!(report.failed_steps().count(), 1);
    }

    #[test]
    fn oversized_bls_request_fails_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let provider = BlsProvider::with_base_url("http://127.0.0.1:9/", None).unwrap();
        let ids = vec!["LNU01073395".to_string()];

        let err = run_bls_download(&config, &provider, &ids, 2000, 2024, None).unwrap_err();
        assert!(matches!(
            err,
            RunError::Data(DataError::YearSpanExceeded { .. })
        ));
    }
}
