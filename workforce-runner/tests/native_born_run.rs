//! Integration tests for the native-born run against a temporary data
//! directory and an in-memory provider.

use chrono::{Datelike, NaiveDate};
use std::path::Path;
use workforce_core::data::store::read_table;
use workforce_core::data::{DataError, NoProgress, SeriesProvider, SeriesStore};
use workforce_core::domain::KnownSeries;
use workforce_core::{DateRange, SeriesSpec, TimeSeriesTable};
use workforce_runner::native_born::{ANNUAL_FILE, COMPARISON_FILE, COMPLETE_DATA_FILE};
use workforce_runner::reporting::manifest::build_manifest;
use workforce_runner::{run_native_born, RunError, StepStatus, WorkforceConfig};

fn months(first_year: i32, last_year: i32) -> Vec<NaiveDate> {
    (first_year..=last_year)
        .flat_map(|y| (1..=12).map(move |m| NaiveDate::from_ymd_opt(y, m, 1).unwrap()))
        .collect()
}

/// Deterministic level for a series on a date.
fn level(spec: &SeriesSpec, date: NaiveDate) -> f64 {
    let step = (date.year() - 2015) as f64 * 12.0 + date.month0() as f64;
    match spec.id.as_str() {
        "CLF16OV" => 157_000.0 + 80.0 * step,
        "CE16OV" => 148_000.0 + 90.0 * step,
        "CIVPART" => 62.7,
        "LNU01073395" => 26_300.0 + 45.0 * step,
        "LNU02073395" => 25_000.0 + 40.0 * step,
        "LNU01373395" => 65.8,
        _ => f64::NAN,
    }
}

fn series_table(spec: &SeriesSpec, dates: &[NaiveDate]) -> TimeSeriesTable {
    TimeSeriesTable::from_observations(
        spec.name.clone(),
        dates.iter().map(|d| (*d, level(spec, *d))).collect(),
    )
}

/// Serves the whole-population series; `fail` lists ids that return 404.
struct TotalsProvider {
    dates: Vec<NaiveDate>,
    fail: Vec<&'static str>,
}

impl SeriesProvider for TotalsProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, series: &SeriesSpec, range: &DateRange) -> Result<TimeSeriesTable, DataError> {
        if self.fail.iter().any(|id| *id == series.id) {
            return Err(DataError::HttpStatus {
                series: series.id.clone(),
                status: 404,
            });
        }
        Ok(series_table(series, &self.dates).between(range.start, range.end))
    }
}

fn config_in(dir: &Path) -> WorkforceConfig {
    WorkforceConfig {
        data_dir: dir.to_path_buf(),
        ..WorkforceConfig::default()
    }
}

fn seed(store: &SeriesStore, specs: &[SeriesSpec], dates: &[NaiveDate]) {
    for spec in specs {
        store
            .write_series("fred", spec, &series_table(spec, dates))
            .unwrap();
    }
}

#[test]
fn full_run_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let dates = months(2015, 2025);
    seed(&config.store(), &KnownSeries::foreign_born_inputs(), &dates);

    let provider = TotalsProvider {
        dates: dates.clone(),
        fail: vec![],
    };
    let report = run_native_born(&config, Some(&provider), &NoProgress).unwrap();

    assert!(report.all_succeeded(), "steps: {:?}", report.steps);
    for file in [COMPLETE_DATA_FILE, COMPARISON_FILE, ANNUAL_FILE] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }
    // 3 downloaded totals + 3 pipeline outputs
    assert_eq!(report.artifacts.len(), 6);

    let complete = read_table(&dir.path().join(COMPLETE_DATA_FILE)).unwrap();
    assert_eq!(complete.len(), dates.len());
    assert_eq!(complete.width(), 11);

    let latest = report.latest.as_ref().unwrap();
    assert_eq!(latest.date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());

    assert_eq!(report.years.len(), 2);
    let growth = report.growth.as_ref().unwrap();
    assert!(growth.foreign_born_pct > growth.native_born_pct);
}

#[test]
fn missing_foreign_born_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let dates = months(2020, 2020);
    // Only two of the three foreign-born inputs exist.
    let fb = KnownSeries::foreign_born_inputs();
    seed(&config.store(), &fb[..2], &dates);

    let provider = TotalsProvider {
        dates,
        fail: vec![],
    };
    let err = run_native_born(&config, Some(&provider), &NoProgress).unwrap_err();
    match err {
        RunError::MissingInput { path, .. } => {
            assert!(path.ends_with("fred_LNU01373395_Foreign_Born_LF_Participation.csv"))
        }
        other => panic!("expected MissingInput, got {other}"),
    }
    assert!(!dir.path().join(COMPLETE_DATA_FILE).exists());
}

#[test]
fn failed_download_falls_back_to_saved_totals() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let dates = months(2015, 2024);
    let store = config.store();
    seed(&store, &KnownSeries::foreign_born_inputs(), &dates);
    seed(&store, &[KnownSeries::TOTAL_EMPLOYMENT.spec()], &dates);

    let provider = TotalsProvider {
        dates: dates.clone(),
        fail: vec!["CE16OV"],
    };
    let report = run_native_born(&config, Some(&provider), &NoProgress).unwrap();

    let failed: Vec<&str> = report.failed_steps().map(|s| s.step.as_str()).collect();
    assert_eq!(failed, vec!["download CE16OV"]);
    assert!(dir.path().join(ANNUAL_FILE).exists());
}

#[test]
fn offline_run_reads_everything_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let dates = months(2015, 2024);
    let store = config.store();
    seed(&store, &KnownSeries::foreign_born_inputs(), &dates);
    seed(&store, &KnownSeries::total_us_inputs(), &dates);

    let report = run_native_born(&config, None, &NoProgress).unwrap();
    assert!(report.all_succeeded());
    // Only the pipeline outputs are new.
    assert_eq!(report.artifacts.len(), 3);
}

#[test]
fn missing_end_year_fails_growth_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let dates = months(2015, 2020);
    let store = config.store();
    seed(&store, &KnownSeries::foreign_born_inputs(), &dates);
    seed(&store, &KnownSeries::total_us_inputs(), &dates);

    let report = run_native_born(&config, None, &NoProgress).unwrap();

    let growth = report.steps.iter().find(|s| s.step == "growth").unwrap();
    assert_eq!(growth.status, StepStatus::Failed);
    assert_eq!(growth.detail, "no annual row for 2024");
    assert!(report.growth.is_none());
    assert!(dir.path().join(ANNUAL_FILE).exists());
}

#[test]
fn reject_policy_fails_derive_and_skips_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.non_finite = workforce_core::pipeline::NonFinitePolicy::Reject;
    let dates = months(2020, 2020);
    let store = config.store();
    seed(&store, &KnownSeries::total_us_inputs(), &dates);
    seed(&store, &KnownSeries::foreign_born_inputs()[..2], &dates);
    // Zero participation rate with zero labor force leaves the population undefined.
    let lfp = KnownSeries::FOREIGN_BORN_LF_PARTICIPATION.spec();
    let zeros = TimeSeriesTable::from_observations(
        lfp.name.clone(),
        dates.iter().map(|d| (*d, 0.0)).collect(),
    );
    store.write_series("fred", &lfp, &zeros).unwrap();
    let fb_lf = KnownSeries::FOREIGN_BORN_LABOR_FORCE.spec();
    let zeros = TimeSeriesTable::from_observations(
        fb_lf.name.clone(),
        dates.iter().map(|d| (*d, 0.0)).collect(),
    );
    store.write_series("fred", &fb_lf, &zeros).unwrap();

    let report = run_native_born(&config, None, &NoProgress).unwrap();

    let statuses: Vec<(&str, StepStatus)> = report
        .steps
        .iter()
        .skip(2)
        .map(|s| (s.step.as_str(), s.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("derive", StepStatus::Failed),
            ("comparison", StepStatus::Skipped),
            ("annual", StepStatus::Skipped),
            ("growth", StepStatus::Skipped),
        ]
    );
}

#[test]
fn rerun_produces_identical_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let dates = months(2015, 2024);
    let store = config.store();
    seed(&store, &KnownSeries::foreign_born_inputs(), &dates);
    seed(&store, &KnownSeries::total_us_inputs(), &dates);

    let first = build_manifest(&run_native_born(&config, None, &NoProgress).unwrap()).unwrap();
    let second = build_manifest(&run_native_born(&config, None, &NoProgress).unwrap()).unwrap();
    assert_eq!(first.output_hash, second.output_hash);
}
