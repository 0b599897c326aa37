//! Workforce CLI: labor-statistics downloads and the native-born pipeline.
//!
//! Commands:
//! - `fred`: download FRED series into the data directory
//! - `bls`: one BLS API request for several series
//! - `scrape`: tables from the BLS foreign-born news release
//! - `native-born`: merge, derive, and aggregate the native-born figures
//! - `compiled`: write the compiled annual-report datasets

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use workforce_core::data::{BlsProvider, FredProvider, ReleaseScraper, StdoutProgress};
use workforce_core::domain::KnownSeries;
use workforce_core::{DateRange, SeriesSpec};
use workforce_runner::reporting::MANIFEST_FILE;
use workforce_runner::{
    render_report, run_bls_download, run_native_born, run_release_scrape, run_series_download,
    write_compiled_datasets, write_manifest, RunError, RunReport, StepOutcome, WorkforceConfig,
};

#[derive(Parser)]
#[command(
    name = "workforce",
    about = "Foreign-born and native-born labor market data"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory. Overrides `data_dir` from the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download FRED series as `fred_{ID}_{Name}.csv`.
    Fred {
        /// Series as `ID=Name` or a catalogue ID. Defaults to the foreign-born inputs.
        series: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to the configured start date.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to the latest observation.
        #[arg(long)]
        end: Option<String>,
    },
    /// Download series from the BLS public data API.
    Bls {
        /// BLS series IDs (e.g., LNU01073395).
        #[arg(required = true)]
        series: Vec<String>,

        #[arg(long)]
        start_year: i32,

        #[arg(long)]
        end_year: i32,

        /// Registration key. Falls back to the config, then `BLS_API_KEY`.
        #[arg(long)]
        api_key: Option<String>,

        /// Long-format output file. Defaults to `bls_api_data_{start}_{end}.csv`.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Scrape the tables of the BLS foreign-born news release.
    Scrape {
        /// Also save every table on the release summary page.
        #[arg(long, default_value_t = false)]
        release_page: bool,
    },
    /// Derive native-born figures from the total and foreign-born series.
    NativeBorn {
        /// Offline mode: read the total series from the data directory.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Write the compiled annual-report datasets.
    Compiled,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.data_dir)?;

    let report = match cli.command {
        Commands::Fred { series, start, end } => run_fred(&config, series, start, end),
        Commands::Bls {
            series,
            start_year,
            end_year,
            api_key,
            output,
        } => run_bls(&config, &series, start_year, end_year, api_key, output),
        Commands::Scrape { release_page } => run_scrape(&config, release_page),
        Commands::NativeBorn { offline } => run_native_born_cmd(&config, offline),
        Commands::Compiled => run_compiled(&config),
    };

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            let missing_input = e
                .downcast_ref::<RunError>()
                .is_some_and(|e| matches!(e, RunError::MissingInput { .. }));
            if missing_input {
                error!("{e}");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    print!("{}", render_report(&report));

    let manifest_path = config.data_dir.join(MANIFEST_FILE);
    let manifest = write_manifest(&manifest_path, &report)?;
    info!(path = %manifest_path.display(), hash = %manifest.output_hash, "manifest written");
    println!("Manifest saved to: {}", manifest_path.display());

    Ok(())
}

fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<WorkforceConfig> {
    let mut config = match path {
        Some(path) => WorkforceConfig::from_file(path)?,
        None => WorkforceConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    config.validate()?;
    Ok(config)
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("--{flag} expects YYYY-MM-DD, got '{value}'"))
}

fn run_fred(
    config: &WorkforceConfig,
    series: Vec<String>,
    start: Option<String>,
    end: Option<String>,
) -> Result<RunReport> {
    let specs: Vec<SeriesSpec> = if series.is_empty() {
        KnownSeries::foreign_born_inputs().to_vec()
    } else {
        series.iter().map(|s| SeriesSpec::parse(s)).collect()
    };

    let configured = config.fred_range();
    let start = match start {
        Some(s) => parse_date("start", &s)?,
        None => configured.start,
    };
    let end = match end {
        Some(s) => parse_date("end", &s)?,
        None => configured.end,
    };
    anyhow::ensure!(end >= start, "--end {end} precedes --start {start}");

    let provider = FredProvider::with_base_url(config.fred.base_url.as_str())?;
    let report = run_series_download(
        config,
        &provider,
        &specs,
        &DateRange::new(start, end),
        &StdoutProgress,
    )?;
    Ok(report)
}

fn run_bls(
    config: &WorkforceConfig,
    series: &[String],
    start_year: i32,
    end_year: i32,
    api_key: Option<String>,
    output: Option<PathBuf>,
) -> Result<RunReport> {
    let key = api_key.or_else(|| config.resolved_api_key());
    if key.is_none() {
        info!("no BLS registration key; unregistered limits apply");
    }
    let provider = BlsProvider::with_base_url(config.bls.base_url.as_str(), key)?;
    let report = run_bls_download(config, &provider, series, start_year, end_year, output)?;
    Ok(report)
}

fn run_scrape(config: &WorkforceConfig, release_page: bool) -> Result<RunReport> {
    let scraper =
        ReleaseScraper::with_base_url(config.scrape.base_url.as_str(), config.scrape_delay())?;
    let report = run_release_scrape(config, &scraper, release_page)?;
    Ok(report)
}

fn run_native_born_cmd(config: &WorkforceConfig, offline: bool) -> Result<RunReport> {
    let report = if offline {
        run_native_born(config, None, &StdoutProgress)?
    } else {
        let provider = FredProvider::with_base_url(config.fred.base_url.as_str())?;
        run_native_born(config, Some(&provider), &StdoutProgress)?
    };
    Ok(report)
}

fn run_compiled(config: &WorkforceConfig) -> Result<RunReport> {
    let mut report = RunReport::new("compiled");
    let paths = write_compiled_datasets(&config.data_dir)?;
    report.record(StepOutcome::succeeded(
        "compiled datasets",
        format!("{} files", paths.len()),
    ));
    for path in paths {
        report.add_artifact(path);
    }
    Ok(report)
}
