//! Data retrieval and persistence.

pub mod bls;
pub mod download;
pub mod fred;
mod http;
pub mod provider;
pub mod scrape;
pub mod store;

pub use bls::{BlsLimits, BlsObservation, BlsProvider};
pub use download::{download_series, DownloadSummary, FetchedSeries};
pub use fred::FredProvider;
pub use provider::{DataError, DownloadProgress, NoProgress, SeriesProvider, StdoutProgress};
pub use scrape::{HtmlTable, ReleaseScraper, ScrapeOutcome};
pub use store::SeriesStore;
