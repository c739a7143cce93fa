//! JSON output for chart comparisons.
//!
//! Serializes a Comparison plus its summary for scripting and piping.

use serde::Serialize;

use crate::chart::compare::{Comparison, Summary};
use crate::error::Result;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    comparison: &'a Comparison,
    summary: Summary,
}

pub fn render(comparison: &Comparison) -> Result<String> {
    let report = JsonReport {
        comparison,
        summary: comparison.summary(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render_overview(comparisons: &[Comparison]) -> Result<String> {
    let reports: Vec<JsonReport> = comparisons
        .iter()
        .map(|comparison| JsonReport {
            comparison,
            summary: comparison.summary(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&reports)?)
}
