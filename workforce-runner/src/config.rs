//! Run configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! data_dir = "labor_market_data"
//! non_finite = "propagate"
//!
//! [fred]
//! start_date = "2015-01-01"
//!
//! [bls]
//! api_key = "..."        # falls back to BLS_API_KEY
//!
//! [scrape]
//! delay_ms = 1000
//!
//! [annual]
//! first_year = 2015
//! last_year = 2024
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use workforce_core::data::bls::BLS_API_URL;
use workforce_core::data::fred::FRED_GRAPH_CSV_URL;
use workforce_core::data::scrape::RELEASE_BASE_URL;
use workforce_core::data::SeriesStore;
use workforce_core::pipeline::{NonFinitePolicy, FIRST_YEAR, LAST_YEAR};
use workforce_core::DateRange;

/// Environment variable consulted when no BLS key is configured.
pub const BLS_API_KEY_ENV: &str = "BLS_API_KEY";

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("invalid config TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration shared by every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkforceConfig {
    /// Directory holding downloaded series and pipeline outputs.
    pub data_dir: PathBuf,
    /// Handling of `NaN`/infinite values produced by the derivation.
    pub non_finite: NonFinitePolicy,
    pub fred: FredConfig,
    pub bls: BlsConfig,
    pub scrape: ScrapeConfig,
    pub annual: AnnualConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FredConfig {
    pub base_url: String,
    /// Observations before this date are dropped.
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub base_url: String,
    /// Pause between successive page requests.
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnualConfig {
    pub first_year: i32,
    pub last_year: i32,
}

impl Default for WorkforceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("labor_market_data"),
            non_finite: NonFinitePolicy::default(),
            fred: FredConfig::default(),
            bls: BlsConfig::default(),
            scrape: ScrapeConfig::default(),
            annual: AnnualConfig::default(),
        }
    }
}

impl Default for FredConfig {
    fn default() -> Self {
        Self {
            base_url: FRED_GRAPH_CSV_URL.to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            end_date: None,
        }
    }
}

impl Default for BlsConfig {
    fn default() -> Self {
        Self {
            base_url: BLS_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: RELEASE_BASE_URL.to_string(),
            delay_ms: 1000,
        }
    }
}

impl Default for AnnualConfig {
    fn default() -> Self {
        Self {
            first_year: FIRST_YEAR,
            last_year: LAST_YEAR,
        }
    }
}

impl WorkforceConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.annual.first_year > self.annual.last_year {
            return Err(ConfigError::Invalid(format!(
                "annual.first_year {} is after annual.last_year {}",
                self.annual.first_year, self.annual.last_year
            )));
        }
        if let Some(end) = self.fred.end_date {
            if end < self.fred.start_date {
                return Err(ConfigError::Invalid(format!(
                    "fred.end_date {end} precedes fred.start_date {}",
                    self.fred.start_date
                )));
            }
        }
        for (field, url) in [
            ("fred.base_url", &self.fred.base_url),
            ("bls.base_url", &self.bls.base_url),
            ("scrape.base_url", &self.scrape.base_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    /// The store rooted at `data_dir`.
    pub fn store(&self) -> SeriesStore {
        SeriesStore::new(&self.data_dir)
    }

    /// Observation window for FRED downloads.
    pub fn fred_range(&self) -> DateRange {
        match self.fred.end_date {
            Some(end) => DateRange::new(self.fred.start_date, end),
            None => DateRange::starting(self.fred.start_date),
        }
    }

    pub fn annual_years(&self) -> RangeInclusive<i32> {
        self.annual.first_year..=self.annual.last_year
    }

    pub fn scrape_delay(&self) -> Duration {
        Duration::from_millis(self.scrape.delay_ms)
    }

    /// The BLS key from the config, else from `BLS_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_api_key(
            self.bls.api_key.as_deref(),
            std::env::var(BLS_API_KEY_ENV).ok(),
        )
    }
}

fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .map(str::to_string)
        .or(from_env)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
