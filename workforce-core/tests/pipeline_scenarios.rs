//! End-to-end scenarios for merge -> derive -> comparison -> annual means,
//! including the CSV round trip through the store.

use chrono::NaiveDate;
use workforce_core::data::store::{read_table, write_annual_csv, write_table_csv};
use workforce_core::data::SeriesStore;
use workforce_core::domain::KnownSeries;
use workforce_core::pipeline::schema::{
    FOREIGN_BORN_LABOR_FORCE, FOREIGN_BORN_SHARE, NATIVE_BORN_LABOR_FORCE, TOTAL_LABOR_FORCE,
};
use workforce_core::pipeline::{
    annual_means, comparison, derive_native_born, growth_pct, merge_all, NonFinitePolicy,
    FIRST_YEAR, LAST_YEAR,
};
use workforce_core::TimeSeriesTable;

fn d(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn series(name: &str, obs: &[(NaiveDate, f64)]) -> TimeSeriesTable {
    TimeSeriesTable::from_observations(name, obs.to_vec())
}

/// The six inputs in the order the native-born merge joins them.
fn inputs(months: &[NaiveDate]) -> Vec<TimeSeriesTable> {
    let col = |name: &str, base: f64, step: f64| {
        let obs: Vec<_> = months
            .iter()
            .enumerate()
            .map(|(i, m)| (*m, base + step * i as f64))
            .collect();
        series(name, &obs)
    };
    vec![
        col(KnownSeries::TOTAL_LABOR_FORCE.name, 157_000.0, 50.0),
        col(KnownSeries::FOREIGN_BORN_LABOR_FORCE.name, 26_000.0, 20.0),
        col(KnownSeries::TOTAL_EMPLOYMENT.name, 148_000.0, 60.0),
        col(KnownSeries::FOREIGN_BORN_EMPLOYMENT.name, 24_500.0, 18.0),
        col(KnownSeries::TOTAL_LF_PARTICIPATION.name, 62.7, 0.0),
        col(KnownSeries::FOREIGN_BORN_LF_PARTICIPATION.name, 65.8, 0.0),
    ]
}

#[test]
fn single_month_residual() {
    let total = series(TOTAL_LABOR_FORCE, &[(d(2020, 1), 160_000.0)]);
    let subset = series(FOREIGN_BORN_LABOR_FORCE, &[(d(2020, 1), 28_000.0)]);

    let merged = merge_all(&[total, subset]).unwrap();
    let residual: Vec<f64> = merged
        .column(TOTAL_LABOR_FORCE)
        .unwrap()
        .iter()
        .zip(merged.column(FOREIGN_BORN_LABOR_FORCE).unwrap())
        .map(|(t, s)| t - s)
        .collect();
    assert_eq!(residual, vec![132_000.0]);
}

#[test]
fn date_missing_from_one_input_is_dropped() {
    let months = [d(2020, 1), d(2020, 2), d(2020, 3)];
    let mut tables = inputs(&months);
    // Foreign-born employment has no February observation.
    tables[3] = series(
        KnownSeries::FOREIGN_BORN_EMPLOYMENT.name,
        &[(d(2020, 1), 24_500.0), (d(2020, 3), 24_600.0)],
    );

    let merged = merge_all(&tables).unwrap();
    assert_eq!(merged.dates(), &[d(2020, 1), d(2020, 3)]);

    let derived = derive_native_born(&merged, NonFinitePolicy::Propagate).unwrap();
    assert_eq!(derived.row_index(d(2020, 2)), None);
}

#[test]
fn full_pipeline_produces_comparison_and_annual_rows() {
    let months: Vec<_> = (2015..=2025)
        .flat_map(|y| (1..=12).map(move |m| d(y, m)))
        .collect();
    let merged = merge_all(&inputs(&months)).unwrap();
    let derived = derive_native_born(&merged, NonFinitePolicy::Reject).unwrap();
    let cmp = comparison(&derived, NonFinitePolicy::Reject).unwrap();

    assert_eq!(cmp.len(), months.len());
    assert_eq!(cmp.width(), 11);
    assert_eq!(cmp.columns().last().unwrap().name, FOREIGN_BORN_SHARE);

    let annual = annual_means(&cmp, FIRST_YEAR..=LAST_YEAR);
    assert_eq!(annual.years(), (2015..=2024).collect::<Vec<_>>().as_slice());

    let fb = growth_pct(&annual, FOREIGN_BORN_LABOR_FORCE, 2015, 2024).unwrap();
    let nb = growth_pct(&annual, NATIVE_BORN_LABOR_FORCE, 2015, 2024).unwrap();
    assert!(fb > 0.0 && nb > 0.0);
}

#[test]
fn annual_growth_matches_reference_figures() {
    let fb = series(
        FOREIGN_BORN_LABOR_FORCE,
        &[(d(2015, 1), 26_300.0), (d(2024, 1), 31_800.0)],
    );
    let annual = annual_means(&fb, FIRST_YEAR..=LAST_YEAR);
    let growth = growth_pct(&annual, FOREIGN_BORN_LABOR_FORCE, 2015, 2024).unwrap();
    assert!((growth - 20.91).abs() < 0.005, "growth was {growth}");
}

#[test]
fn rerun_on_same_inputs_is_byte_identical() {
    let months: Vec<_> = (2019..=2021)
        .flat_map(|y| (1..=12).map(move |m| d(y, m)))
        .collect();

    let run = || {
        let merged = merge_all(&inputs(&months)).unwrap();
        let derived = derive_native_born(&merged, NonFinitePolicy::Propagate).unwrap();
        let cmp = comparison(&derived, NonFinitePolicy::Propagate).unwrap();
        let annual = annual_means(&cmp, FIRST_YEAR..=LAST_YEAR);

        let mut derived_csv = Vec::new();
        write_table_csv(&mut derived_csv, &derived).unwrap();
        let mut cmp_csv = Vec::new();
        write_table_csv(&mut cmp_csv, &cmp).unwrap();
        let mut annual_csv = Vec::new();
        write_annual_csv(&mut annual_csv, &annual).unwrap();
        (derived_csv, cmp_csv, annual_csv)
    };

    assert_eq!(run(), run());
}

#[test]
fn persisted_inputs_reload_to_the_same_merge() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let months = [d(2020, 1), d(2020, 2)];
    let tables = inputs(&months);

    let specs: Vec<_> = KnownSeries::total_us_inputs()
        .into_iter()
        .chain(KnownSeries::foreign_born_inputs())
        .collect();
    for spec in &specs {
        let table = tables
            .iter()
            .find(|t| t.has_column(&spec.name))
            .unwrap();
        store.write_series("fred", spec, table).unwrap();
    }

    let reloaded: Vec<_> = tables
        .iter()
        .map(|t| {
            let name = t.column_names().next().unwrap();
            let spec = specs.iter().find(|s| s.name == name).unwrap();
            read_table(&store.series_path("fred", spec)).unwrap()
        })
        .collect();

    assert_eq!(merge_all(&reloaded).unwrap(), merge_all(&tables).unwrap());
}
