//! Stage schema contracts.
//!
//! Each stage declares the columns it reads. Inputs are checked against the
//! contract before any arithmetic runs, so a renamed upstream column fails
//! with a named `missing field` error instead of a silent `NaN` column.

use super::PipelineError;
use crate::domain::{KnownSeries, TimeSeriesTable};

pub const TOTAL_LABOR_FORCE: &str = KnownSeries::TOTAL_LABOR_FORCE.name;
pub const TOTAL_EMPLOYMENT: &str = KnownSeries::TOTAL_EMPLOYMENT.name;
pub const TOTAL_LF_PARTICIPATION: &str = KnownSeries::TOTAL_LF_PARTICIPATION.name;
pub const FOREIGN_BORN_LABOR_FORCE: &str = KnownSeries::FOREIGN_BORN_LABOR_FORCE.name;
pub const FOREIGN_BORN_EMPLOYMENT: &str = KnownSeries::FOREIGN_BORN_EMPLOYMENT.name;
pub const FOREIGN_BORN_LF_PARTICIPATION: &str = KnownSeries::FOREIGN_BORN_LF_PARTICIPATION.name;

pub const NATIVE_BORN_LABOR_FORCE: &str = "Native_Born_Labor_Force";
pub const NATIVE_BORN_EMPLOYMENT: &str = "Native_Born_Employment";
pub const NATIVE_BORN_LF_PARTICIPATION: &str = "Native_Born_LF_Participation";
pub const FOREIGN_BORN_EMP_POP_RATIO: &str = "Foreign_Born_Emp_Pop_Ratio";
pub const NATIVE_BORN_EMP_POP_RATIO: &str = "Native_Born_Emp_Pop_Ratio";
pub const FOREIGN_BORN_SHARE: &str = "Foreign_Born_Share_%";

/// Columns appended by `derive_native_born`, in output order.
pub const DERIVED_COLUMNS: [&str; 5] = [
    NATIVE_BORN_LABOR_FORCE,
    NATIVE_BORN_EMPLOYMENT,
    NATIVE_BORN_LF_PARTICIPATION,
    FOREIGN_BORN_EMP_POP_RATIO,
    NATIVE_BORN_EMP_POP_RATIO,
];

/// Columns projected by `comparison`, in output order (the share follows).
pub const COMPARISON_COLUMNS: [&str; 10] = [
    FOREIGN_BORN_LABOR_FORCE,
    NATIVE_BORN_LABOR_FORCE,
    TOTAL_LABOR_FORCE,
    FOREIGN_BORN_EMPLOYMENT,
    NATIVE_BORN_EMPLOYMENT,
    TOTAL_EMPLOYMENT,
    FOREIGN_BORN_LF_PARTICIPATION,
    NATIVE_BORN_LF_PARTICIPATION,
    FOREIGN_BORN_EMP_POP_RATIO,
    NATIVE_BORN_EMP_POP_RATIO,
];

/// The columns a stage requires of its input.
#[derive(Debug, Clone, Copy)]
pub struct StageSchema {
    pub stage: &'static str,
    pub columns: &'static [&'static str],
}

impl StageSchema {
    /// Fail on the first required column the table lacks.
    pub fn require(&self, table: &TimeSeriesTable) -> Result<(), PipelineError> {
        match self.columns.iter().find(|c| !table.has_column(c)) {
            Some(column) => Err(PipelineError::MissingField {
                stage: self.stage,
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

pub const DERIVE_INPUT: StageSchema = StageSchema {
    stage: "derive",
    columns: &[
        TOTAL_LABOR_FORCE,
        FOREIGN_BORN_LABOR_FORCE,
        TOTAL_EMPLOYMENT,
        FOREIGN_BORN_EMPLOYMENT,
        TOTAL_LF_PARTICIPATION,
        FOREIGN_BORN_LF_PARTICIPATION,
    ],
};

pub const COMPARISON_INPUT: StageSchema = StageSchema {
    stage: "comparison",
    columns: &COMPARISON_COLUMNS,
};
