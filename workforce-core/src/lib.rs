//! Workforce Core: series tables, data providers, and the merge/derive/aggregate stages.
//!
//! This crate contains everything that does not need a run configuration:
//! - Domain types (date-keyed tables, series identifiers, the series catalogue)
//! - FRED and BLS providers behind the `SeriesProvider` trait
//! - BLS news-release table scraping
//! - CSV persistence for tables and scraped pages
//! - Pure pipeline stages: inner-join merge, native-born derivation, annual means

pub mod data;
pub mod domain;
pub mod pipeline;

pub use domain::{Column, DateRange, SeriesSpec, TableError, TimeSeriesTable};
