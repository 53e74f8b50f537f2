//! Report rendering for stdout

use token_pool::StatsReport;

use crate::config::OutputFormat;

/// Render the stats report in the configured format.
pub fn render(report: &StatsReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}

/// Banner printed before a text-mode run.
pub fn simulation_banner(operations: i64) -> String {
    format!("Starting simulation with {operations} operations...")
}
