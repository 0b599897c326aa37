//! Human-readable run summary.
//!
//! Rendered to a `String` so the layout can be tested; the CLI prints it.

use crate::report::{GroupFigures, RunReport, StepStatus};
use std::fmt::Write;

/// Round to a whole number and group digits with commas (`164,606`).
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        "n/a".to_string()
    }
}

/// Full console summary: steps, snapshots, then the file manifest.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &RunReport) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "=== {} ===", report.command)?;
    for step in &report.steps {
        let mark = match step.status {
            StepStatus::Succeeded => "OK  ",
            StepStatus::Failed => "FAIL",
            StepStatus::Skipped => "SKIP",
        };
        writeln!(out, "[{mark}] {}: {}", step.step, step.detail)?;
    }

    if let Some(latest) = &report.latest {
        writeln!(out)?;
        writeln!(out, "--- Latest month ({}) ---", latest.date)?;
        write_group(out, "Foreign-born", &latest.foreign_born)?;
        write_group(out, "Native-born", &latest.native_born)?;
        writeln!(
            out,
            "Foreign-born share: {}",
            format_pct(latest.foreign_born_share_pct)
        )?;
    }

    if !report.years.is_empty() {
        writeln!(out)?;
        writeln!(out, "--- Annual averages ---")?;
        for year in &report.years {
            writeln!(
                out,
                "{}: FB labor force {:>8}k | NB {:>9}k | FB share {:>6}",
                year.year,
                format_thousands(year.foreign_born_labor_force),
                format_thousands(year.native_born_labor_force),
                format_pct(year.foreign_born_share_pct),
            )?;
        }
    }

    if let Some(growth) = &report.growth {
        writeln!(out)?;
        writeln!(out, "--- Growth ({}-{}) ---", growth.from_year, growth.to_year)?;
        writeln!(out, "Foreign-born: {:+.1}%", growth.foreign_born_pct)?;
        writeln!(out, "Native-born:  {:+.1}%", growth.native_born_pct)?;
    }

    writeln!(out)?;
    if report.artifacts.is_empty() {
        writeln!(out, "No files written.")?;
    } else {
        writeln!(out, "Files written:")?;
        for (i, path) in report.artifacts.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, path.display())?;
        }
    }
    Ok(())
}

fn write_group(out: &mut String, label: &str, g: &GroupFigures) -> std::fmt::Result {
    writeln!(out, "{label}:")?;
    writeln!(out, "  Labor force:   {:>10} thousand", format_thousands(g.labor_force))?;
    writeln!(out, "  Employment:    {:>10} thousand", format_thousands(g.employment))?;
    writeln!(out, "  LF particip.:  {:>10}", format_pct(g.lf_participation_pct))?;
    writeln!(out, "  Emp-pop ratio: {:>10}", format_pct(g.emp_pop_ratio_pct))
}
