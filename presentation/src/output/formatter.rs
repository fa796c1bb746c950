//! Output formatter trait

use xplain_domain::AggregatedResult;

/// Trait for formatting explanation results
pub trait OutputFormatter {
    /// Format every field of every record
    fn format(&self, result: &AggregatedResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &AggregatedResult) -> String;

    /// Format the strongest `top_k` attributions of each record
    fn format_summary(&self, result: &AggregatedResult, top_k: usize) -> String;
}
