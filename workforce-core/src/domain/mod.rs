//! Domain types shared by every stage.

pub mod series;
pub mod table;

pub use series::{DateRange, KnownSeries, SeriesSpec};
pub use table::{Column, TableError, TimeSeriesTable};
