//! Native-born derivation and the foreign-vs-native comparison table.
//!
//! Native-born figures are residuals: whole population minus foreign born.
//! Population sizes are backed out of the participation rates
//! (`pop = labor_force / (rate / 100)`), so the derived participation and
//! employment-population ratios are estimates. Residuals are not clamped.

use super::schema::{
    COMPARISON_COLUMNS, COMPARISON_INPUT, DERIVE_INPUT, FOREIGN_BORN_EMPLOYMENT,
    FOREIGN_BORN_EMP_POP_RATIO, FOREIGN_BORN_LABOR_FORCE, FOREIGN_BORN_LF_PARTICIPATION,
    FOREIGN_BORN_SHARE, NATIVE_BORN_EMPLOYMENT, NATIVE_BORN_EMP_POP_RATIO,
    NATIVE_BORN_LABOR_FORCE, NATIVE_BORN_LF_PARTICIPATION, TOTAL_EMPLOYMENT, TOTAL_LABOR_FORCE,
    TOTAL_LF_PARTICIPATION,
};
use super::PipelineError;
use crate::domain::TimeSeriesTable;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do when a division yields `NaN` or an infinity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Keep the value; the count is logged.
    #[default]
    Propagate,
    /// Fail the stage on the first non-finite value.
    Reject,
}

/// Append the native-born columns to a merged table.
pub fn derive_native_born(
    merged: &TimeSeriesTable,
    policy: NonFinitePolicy,
) -> Result<TimeSeriesTable, PipelineError> {
    DERIVE_INPUT.require(merged)?;

    let total_lf = merged.column(TOTAL_LABOR_FORCE)?;
    let fb_lf = merged.column(FOREIGN_BORN_LABOR_FORCE)?;
    let total_emp = merged.column(TOTAL_EMPLOYMENT)?;
    let fb_emp = merged.column(FOREIGN_BORN_EMPLOYMENT)?;
    let total_lfp = merged.column(TOTAL_LF_PARTICIPATION)?;
    let fb_lfp = merged.column(FOREIGN_BORN_LF_PARTICIPATION)?;

    let n = merged.len();
    let mut nb_lf = Vec::with_capacity(n);
    let mut nb_emp = Vec::with_capacity(n);
    let mut nb_lfp = Vec::with_capacity(n);
    let mut fb_epr = Vec::with_capacity(n);
    let mut nb_epr = Vec::with_capacity(n);

    for i in 0..n {
        let pop_total = total_lf[i] / (total_lfp[i] / 100.0);
        let pop_fb = fb_lf[i] / (fb_lfp[i] / 100.0);
        let pop_nb = pop_total - pop_fb;

        let lf = total_lf[i] - fb_lf[i];
        let emp = total_emp[i] - fb_emp[i];

        nb_lf.push(lf);
        nb_emp.push(emp);
        nb_lfp.push(lf / pop_nb * 100.0);
        fb_epr.push(fb_emp[i] / pop_fb * 100.0);
        nb_epr.push(emp / pop_nb * 100.0);
    }

    let derived = [
        (NATIVE_BORN_LABOR_FORCE, nb_lf),
        (NATIVE_BORN_EMPLOYMENT, nb_emp),
        (NATIVE_BORN_LF_PARTICIPATION, nb_lfp),
        (FOREIGN_BORN_EMP_POP_RATIO, fb_epr),
        (NATIVE_BORN_EMP_POP_RATIO, nb_epr),
    ];

    let mut out = merged.clone();
    for (name, values) in derived {
        check_finite(&out, name, &values, policy)?;
        out = out.with_column(name, values)?;
    }
    Ok(out)
}

/// Project the comparison columns and append the foreign-born share of the
/// labor force.
pub fn comparison(
    derived: &TimeSeriesTable,
    policy: NonFinitePolicy,
) -> Result<TimeSeriesTable, PipelineError> {
    COMPARISON_INPUT.require(derived)?;

    let table = derived.select(&COMPARISON_COLUMNS)?;
    let share: Vec<f64> = table
        .column(FOREIGN_BORN_LABOR_FORCE)?
        .iter()
        .zip(table.column(TOTAL_LABOR_FORCE)?)
        .map(|(fb, total)| fb / total * 100.0)
        .collect();

    check_finite(&table, FOREIGN_BORN_SHARE, &share, policy)?;
    Ok(table.with_column(FOREIGN_BORN_SHARE, share)?)
}

fn check_finite(
    table: &TimeSeriesTable,
    column: &str,
    values: &[f64],
    policy: NonFinitePolicy,
) -> Result<(), PipelineError> {
    match policy {
        NonFinitePolicy::Reject => {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(PipelineError::NonFinite {
                    column: column.to_string(),
                    date: table.dates()[i],
                });
            }
        }
        NonFinitePolicy::Propagate => {
            let count = values.iter().filter(|v| !v.is_finite()).count();
            if count > 0 {
                warn!(column, count, "non-finite derived values");
            }
        }
    }
    Ok(())
}
