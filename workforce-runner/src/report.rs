//! Structured run report.
//!
//! Each step records its outcome instead of printing; the console summary and
//! the JSON manifest are both rendered from this one value.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use workforce_core::pipeline::schema::{
    FOREIGN_BORN_EMPLOYMENT, FOREIGN_BORN_EMP_POP_RATIO, FOREIGN_BORN_LABOR_FORCE,
    FOREIGN_BORN_LF_PARTICIPATION, FOREIGN_BORN_SHARE, NATIVE_BORN_EMPLOYMENT,
    NATIVE_BORN_EMP_POP_RATIO, NATIVE_BORN_LABOR_FORCE, NATIVE_BORN_LF_PARTICIPATION,
};
use workforce_core::pipeline::{AnnualAverages, PipelineError};
use workforce_core::TimeSeriesTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// Not attempted because an earlier step it depends on failed.
    Skipped,
}

/// Outcome of one step of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    pub status: StepStatus,
    pub detail: String,
}

impl StepOutcome {
    pub fn succeeded(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Succeeded,
            detail: detail.into(),
        }
    }

    pub fn failed(step: impl Into<String>, error: &dyn fmt::Display) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Failed,
            detail: error.to_string(),
        }
    }

    pub fn skipped(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Skipped,
            detail: reason.into(),
        }
    }
}

/// The latest month of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub foreign_born: GroupFigures,
    pub native_born: GroupFigures,
    pub foreign_born_share_pct: f64,
}

/// Labor-market figures for one population group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFigures {
    /// Thousands.
    pub labor_force: f64,
    /// Thousands.
    pub employment: f64,
    pub lf_participation_pct: f64,
    pub emp_pop_ratio_pct: f64,
}

impl LatestSnapshot {
    pub fn from_comparison(table: &TimeSeriesTable) -> Result<Self, PipelineError> {
        let row = table
            .len()
            .checked_sub(1)
            .ok_or(PipelineError::EmptyTable("comparison"))?;
        let date = table.dates()[row];
        let at = |name: &str| table.value_at(row, name);

        Ok(Self {
            date,
            foreign_born: GroupFigures {
                labor_force: at(FOREIGN_BORN_LABOR_FORCE)?,
                employment: at(FOREIGN_BORN_EMPLOYMENT)?,
                lf_participation_pct: at(FOREIGN_BORN_LF_PARTICIPATION)?,
                emp_pop_ratio_pct: at(FOREIGN_BORN_EMP_POP_RATIO)?,
            },
            native_born: GroupFigures {
                labor_force: at(NATIVE_BORN_LABOR_FORCE)?,
                employment: at(NATIVE_BORN_EMPLOYMENT)?,
                lf_participation_pct: at(NATIVE_BORN_LF_PARTICIPATION)?,
                emp_pop_ratio_pct: at(NATIVE_BORN_EMP_POP_RATIO)?,
            },
            foreign_born_share_pct: at(FOREIGN_BORN_SHARE)?,
        })
    }
}

/// One annual row, reduced to the headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub year: i32,
    pub foreign_born_labor_force: f64,
    pub native_born_labor_force: f64,
    pub foreign_born_share_pct: f64,
}

impl YearSnapshot {
    pub fn from_annual(annual: &AnnualAverages, year: i32) -> Result<Self, PipelineError> {
        Ok(Self {
            year,
            foreign_born_labor_force: annual.value(year, FOREIGN_BORN_LABOR_FORCE)?,
            native_born_labor_force: annual.value(year, NATIVE_BORN_LABOR_FORCE)?,
            foreign_born_share_pct: annual.value(year, FOREIGN_BORN_SHARE)?,
        })
    }
}

/// Labor-force growth between the first and last annual rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub from_year: i32,
    pub to_year: i32,
    pub foreign_born_pct: f64,
    pub native_born_pct: f64,
}

/// Everything a command did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepOutcome>,
    /// Files written during the run, in write order.
    pub artifacts: Vec<PathBuf>,
    pub latest: Option<LatestSnapshot>,
    pub years: Vec<YearSnapshot>,
    pub growth: Option<GrowthSummary>,
}

impl RunReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            started_at: Utc::now(),
            steps: Vec::new(),
            artifacts: Vec::new(),
            latest: None,
            years: Vec::new(),
            growth: None,
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    pub fn add_artifact(&mut self, path: PathBuf) {
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::Succeeded)
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_steps().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_and_skips_count_as_unsuccessful() {
        let mut report = RunReport::new("native-born");
        report.record(StepOutcome::succeeded("merge", "12 rows"));
        assert!(report.all_succeeded());

        report.record(StepOutcome::failed("growth", &PipelineError::MissingYear(2024)));
        report.record(StepOutcome::skipped("annual", "comparison failed"));
        let failed: Vec<&str> = report.failed_steps().map(|s| s.step.as_str()).collect();
        assert_eq!(failed, vec!["growth", "annual"]);
        assert_eq!(report.steps[1].detail, "no annual row for 2024");
    }

    #[test]
    fn artifacts_are_unique_in_write_order() {
        let mut report = RunReport::new("fred");
        report.add_artifact(PathBuf::from("b.csv"));
        report.add_artifact(PathBuf::from("a.csv"));
        report.add_artifact(PathBuf::from("b.csv"));
        assert_eq!(
            report.artifacts,
            vec![PathBuf::from("b.csv"), PathBuf::from("a.csv")]
        );
    }

    #[test]
    fn latest_snapshot_of_empty_table_is_an_error() {
        let err = LatestSnapshot::from_comparison(&TimeSeriesTable::default()).unwrap_err();
        assert_eq!(err, PipelineError::EmptyTable("comparison"));
    }
}
