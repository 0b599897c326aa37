//! Pure table-to-table stages of the native-born pipeline.
//!
//! merge (inner join on date) -> derive (native-born residuals and ratios)
//! -> comparison (projection plus foreign-born share) -> annual means.
//!
//! No stage touches the filesystem or the network.

pub mod aggregate;
pub mod derive;
pub mod merge;
pub mod schema;

pub use aggregate::{annual_means, growth_pct, AnnualAverages, FIRST_YEAR, LAST_YEAR};
pub use derive::{comparison, derive_native_born, NonFinitePolicy};
pub use merge::{inner_join, merge_all};
pub use schema::StageSchema;

use crate::domain::TableError;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by pipeline stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("no input tables to merge")]
    NoInputs,

    #[error("missing field '{column}' in {stage} input")]
    MissingField { stage: &'static str, column: String },

    #[error("non-finite value in '{column}' on {date}")]
    NonFinite { column: String, date: NaiveDate },

    #[error("no annual row for {0}")]
    MissingYear(i32),

    #[error("{0} table is empty")]
    EmptyTable(&'static str),

    #[error(transparent)]
    Table(#[from] TableError),
}
