//! Workforce Runner: configuration, pipeline runs, compiled datasets, reporting.
//!
//! This crate builds on `workforce-core` to provide:
//! - TOML run configuration with defaults for every field
//! - The native-born derivation run (download totals, merge, derive, annual means)
//! - Download commands for FRED, the BLS API, and BLS release tables
//! - The hand-compiled workforce datasets
//! - Console summaries and the JSON run manifest

pub mod compiled;
pub mod config;
pub mod fetch;
pub mod native_born;
pub mod report;
pub mod reporting;

pub use compiled::write_compiled_datasets;
pub use config::{ConfigError, WorkforceConfig};
pub use fetch::{run_bls_download, run_release_scrape, run_series_download};
pub use native_born::{run_native_born, RunError};
pub use report::{GrowthSummary, LatestSnapshot, RunReport, StepOutcome, StepStatus, YearSnapshot};
pub use reporting::{render_report, write_manifest, RunManifest};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<WorkforceConfig>();
        assert_sync::<WorkforceConfig>();
    }

    #[test]
    fn run_report_is_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }

    #[test]
    fn manifest_is_send_sync() {
        assert_send::<RunManifest>();
        assert_sync::<RunManifest>();
    }
}
