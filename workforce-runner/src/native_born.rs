//! Native-born derivation run.
//!
//! Steps, in order:
//! 1. Download the whole-population series from FRED (optional; falls back to
//!    the previously saved files when a download fails or runs offline)
//! 2. Load the previously downloaded foreign-born series
//! 3. Merge on date and derive the native-born columns
//! 4. Comparison table with the foreign-born share
//! 5. Annual means over the configured years
//! 6. Labor-force growth between the first and last year
//!
//! Missing inputs in steps 1–2 abort the run. From step 3 on, a failure is
//! recorded in the report and the steps that depend on it are skipped.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use workforce_core::data::store::{write_annual, write_table};
use workforce_core::data::{
    download_series, DataError, DownloadProgress, SeriesProvider, SeriesStore,
};
use workforce_core::domain::KnownSeries;
use workforce_core::pipeline::schema::{FOREIGN_BORN_LABOR_FORCE, NATIVE_BORN_LABOR_FORCE};
use workforce_core::pipeline::{
    annual_means, comparison, derive_native_born, growth_pct, merge_all, AnnualAverages,
};
use workforce_core::{SeriesSpec, TimeSeriesTable};

use crate::config::{ConfigError, WorkforceConfig};
use crate::report::{GrowthSummary, LatestSnapshot, RunReport, StepOutcome, YearSnapshot};

pub const COMPLETE_DATA_FILE: &str = "complete_labor_force_data.csv";
pub const COMPARISON_FILE: &str = "foreign_vs_native_comparison.csv";
pub const ANNUAL_FILE: &str = "annual_foreign_vs_native.csv";

/// Source prefix of the series files this run reads.
const SOURCE: &str = "fred";

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("missing input {}: {reason}", path.display())]
    MissingInput { path: PathBuf, reason: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Run the native-born pipeline against the configured data directory.
///
/// With `provider = None` no network request is made and the whole-population
/// series must already be on disk.
pub fn run_native_born(
    config: &WorkforceConfig,
    provider: Option<&dyn SeriesProvider>,
    progress: &dyn DownloadProgress,
) -> Result<RunReport, RunError> {
    let store = config.store();
    store.ensure_dir()?;
    let mut report = RunReport::new("native-born");

    let totals = load_totals(config, &store, provider, progress, &mut report)?;
    let foreign_born = load_inputs(&store, &KnownSeries::foreign_born_inputs())?;
    report.record(StepOutcome::succeeded(
        "load foreign-born",
        format!("{} series", foreign_born.len()),
    ));

    // Join order: each total followed by its foreign-born counterpart.
    let inputs: Vec<TimeSeriesTable> = totals
        .into_iter()
        .zip(foreign_born)
        .flat_map(|(total, fb)| [total, fb])
        .collect();

    let Some(derived) = derive_step(config, &store, &inputs, &mut report) else {
        skip(&mut report, &["comparison", "annual", "growth"], "derive failed");
        return Ok(report);
    };
    let Some(cmp) = comparison_step(config, &store, &derived, &mut report) else {
        skip(&mut report, &["annual", "growth"], "comparison failed");
        return Ok(report);
    };
    let Some(annual) = annual_step(config, &store, &cmp, &mut report) else {
        skip(&mut report, &["growth"], "annual failed");
        return Ok(report);
    };
    growth_step(config, &annual, &mut report);

    Ok(report)
}

/// Whole-population inputs: downloaded when a provider is given, else (or on
/// failure) read back from the store.
fn load_totals(
    config: &WorkforceConfig,
    store: &SeriesStore,
    provider: Option<&dyn SeriesProvider>,
    progress: &dyn DownloadProgress,
    report: &mut RunReport,
) -> Result<Vec<TimeSeriesTable>, RunError> {
    let specs = KnownSeries::total_us_inputs();

    let Some(provider) = provider else {
        let tables = load_inputs(store, &specs)?;
        report.record(StepOutcome::succeeded(
            "load totals",
            "offline, read from data directory",
        ));
        return Ok(tables);
    };

    let summary = download_series(provider, store, &specs, &config.fred_range(), progress);
    for fetched in &summary.fetched {
        report.add_artifact(fetched.path.clone());
        report.record(StepOutcome::succeeded(
            format!("download {}", fetched.spec.id),
            format!("{} records", fetched.table.len()),
        ));
    }
    for (spec, err) in &summary.errors {
        report.record(StepOutcome::failed(format!("download {}", spec.id), err));
    }

    let mut tables = Vec::with_capacity(specs.len());
    for spec in &specs {
        match summary.table_for(&spec.name) {
            Some(table) => tables.push(table.clone()),
            None => {
                warn!(series = %spec.id, "download failed, using saved file");
                tables.push(load_input(store, spec)?);
            }
        }
    }
    Ok(tables)
}

fn load_inputs(store: &SeriesStore, specs: &[SeriesSpec]) -> Result<Vec<TimeSeriesTable>, RunError> {
    specs.iter().map(|spec| load_input(store, spec)).collect()
}

fn load_input(store: &SeriesStore, spec: &SeriesSpec) -> Result<TimeSeriesTable, RunError> {
    let table = store
        .load_series(SOURCE, spec)
        .map_err(|e| RunError::MissingInput {
            path: store.series_path(SOURCE, spec),
            reason: e.to_string(),
        })?;
    info!(series = %spec.id, rows = table.len(), "loaded input");
    Ok(table)
}

fn derive_step(
    config: &WorkforceConfig,
    store: &SeriesStore,
    inputs: &[TimeSeriesTable],
    report: &mut RunReport,
) -> Option<TimeSeriesTable> {
    let result = merge_all(inputs)
        .and_then(|merged| derive_native_born(&merged, config.non_finite))
        .map_err(|e| e.to_string())
        .and_then(|derived| {
            persist_table(store, COMPLETE_DATA_FILE, &derived, report)?;
            Ok(derived)
        });

    match result {
        Ok(derived) => {
            report.record(StepOutcome::succeeded(
                "derive",
                format!("{} rows x {} columns", derived.len(), derived.width() + 1),
            ));
            Some(derived)
        }
        Err(e) => {
            report.record(StepOutcome::failed("derive", &e));
            None
        }
    }
}

fn comparison_step(
    config: &WorkforceConfig,
    store: &SeriesStore,
    derived: &TimeSeriesTable,
    report: &mut RunReport,
) -> Option<TimeSeriesTable> {
    let result = comparison(derived, config.non_finite)
        .map_err(|e| e.to_string())
        .and_then(|cmp| {
            persist_table(store, COMPARISON_FILE, &cmp, report)?;
            Ok(cmp)
        });

    match result {
        Ok(cmp) => {
            match LatestSnapshot::from_comparison(&cmp) {
                Ok(latest) => report.latest = Some(latest),
                Err(e) => warn!(error = %e, "no latest row to report"),
            }
            report.record(StepOutcome::succeeded(
                "comparison",
                format!("{} rows", cmp.len()),
            ));
            Some(cmp)
        }
        Err(e) => {
            report.record(StepOutcome::failed("comparison", &e));
            None
        }
    }
}

fn annual_step(
    config: &WorkforceConfig,
    store: &SeriesStore,
    cmp: &TimeSeriesTable,
    report: &mut RunReport,
) -> Option<AnnualAverages> {
    let annual = annual_means(cmp, config.annual_years());
    let path = store.artifact_path(ANNUAL_FILE);

    if let Err(e) = write_annual(&path, &annual) {
        report.record(StepOutcome::failed("annual", &e));
        return None;
    }
    report.add_artifact(path);

    for year in [config.annual.first_year, config.annual.last_year] {
        match YearSnapshot::from_annual(&annual, year) {
            Ok(snapshot) => report.years.push(snapshot),
            Err(e) => warn!(year, error = %e, "annual row unavailable"),
        }
    }
    report.record(StepOutcome::succeeded(
        "annual",
        format!("{} years", annual.len()),
    ));
    Some(annual)
}

fn growth_step(config: &WorkforceConfig, annual: &AnnualAverages, report: &mut RunReport) {
    let (from, to) = (config.annual.first_year, config.annual.last_year);
    let result = growth_pct(annual, FOREIGN_BORN_LABOR_FORCE, from, to).and_then(|fb| {
        growth_pct(annual, NATIVE_BORN_LABOR_FORCE, from, to).map(|nb| (fb, nb))
    });

    match result {
        Ok((fb, nb)) => {
            report.growth = Some(GrowthSummary {
                from_year: from,
                to_year: to,
                foreign_born_pct: fb,
                native_born_pct: nb,
            });
            report.record(StepOutcome::succeeded(
                "growth",
                format!("{from}-{to}: foreign-born {fb:+.1}%, native-born {nb:+.1}%"),
            ));
        }
        Err(e) => report.record(StepOutcome::failed("growth", &e)),
    }
}

fn persist_table(
    store: &SeriesStore,
    file_name: &str,
    table: &TimeSeriesTable,
    report: &mut RunReport,
) -> Result<(), String> {
    let path = store.artifact_path(file_name);
    write_table(&path, table).map_err(|e| e.to_string())?;
    info!(path = %path.display(), rows = table.len(), "saved");
    report.add_artifact(path);
    Ok(())
}

fn skip(report: &mut RunReport, steps: &[&str], reason: &str) {
    for step in steps {
        report.record(StepOutcome::skipped(*step, reason));
    }
}
