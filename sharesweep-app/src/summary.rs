//! Operator-facing output: one line per user as it finishes, totals at the end.

use sharesweep_core::{BatchReport, IdentityOutcome};
use std::fmt::Write;

pub fn outcome_line(outcome: &IdentityOutcome) -> String {
    match &outcome.result {
        Ok(_) => format!("Shared files for {} saved and copied.", outcome.identity),
        Err(err) => format!("Failed for {}: {}", outcome.identity, err),
    }
}

pub fn totals(report: &BatchReport) -> String {
    let mut out = format!(
        "Processed {} of {} users: {} succeeded, {} failed",
        report.outcomes.len(),
        report.roster_size,
        report.succeeded(),
        report.failures().count()
    );
    if report.cancelled {
        let _ = write!(out, " (cancelled, {} not processed)", report.not_processed());
    }
    out
}

/// Every outcome line followed by the totals.
pub fn render(report: &BatchReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        out.push_str(&outcome_line(outcome));
        out.push('\n');
    }
    out.push_str(&totals(report));
    out.push('\n');
    out
}
