//! Criterion benchmarks for the pipeline hot paths.
//!
//! 1. Six-way inner join (the native-born merge shape)
//! 2. Derivation over the merged table
//! 3. Annual means

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use workforce_core::domain::KnownSeries;
use workforce_core::pipeline::{annual_means, derive_native_born, merge_all, NonFinitePolicy};
use workforce_core::TimeSeriesTable;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_inputs(days: usize) -> Vec<TimeSeriesTable> {
    let base = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let names = [
        (KnownSeries::TOTAL_LABOR_FORCE.name, 150_000.0),
        (KnownSeries::FOREIGN_BORN_LABOR_FORCE.name, 25_000.0),
        (KnownSeries::TOTAL_EMPLOYMENT.name, 140_000.0),
        (KnownSeries::FOREIGN_BORN_EMPLOYMENT.name, 23_000.0),
        (KnownSeries::TOTAL_LF_PARTICIPATION.name, 62.5),
        (KnownSeries::FOREIGN_BORN_LF_PARTICIPATION.name, 66.0),
    ];
    names
        .iter()
        .enumerate()
        .map(|(k, (name, level))| {
            // Each input skips a different residue class so the join does work.
            let obs = (0..days)
                .filter(|i| i % 7 != k)
                .map(|i| {
                    let date = base + chrono::Duration::days(i as i64);
                    (date, level + (i as f64 * 0.01).sin())
                })
                .collect();
            TimeSeriesTable::from_observations(*name, obs)
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_all");
    for days in [1_000usize, 10_000] {
        let inputs = make_inputs(days);
        group.bench_with_input(BenchmarkId::from_parameter(days), &inputs, |b, inputs| {
            b.iter(|| merge_all(black_box(inputs)).unwrap())
        });
    }
    group.finish();
}

fn bench_derive(c: &mut Criterion) {
    let merged = merge_all(&make_inputs(10_000)).unwrap();
    c.bench_function("derive_native_born_10k", |b| {
        b.iter(|| derive_native_born(black_box(&merged), NonFinitePolicy::Propagate).unwrap())
    });
}

fn bench_annual(c: &mut Criterion) {
    let merged = merge_all(&make_inputs(10_000)).unwrap();
    c.bench_function("annual_means_10k", |b| {
        b.iter(|| annual_means(black_box(&merged), 1990..=2024))
    });
}

criterion_group!(benches, bench_merge, bench_derive, bench_annual);
criterion_main!(benches);
