//! Console output formatter for explanation results

use crate::config::OutputConfig;
use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use xplain_domain::{
    AggregatedResult, AlgorithmDescriptor, DataDomain, Explanation, ExplanationRecord, FieldValue,
    OutputFormat,
};

/// Label/value field pairs that summaries rank, in lookup order
const RANKED_PAIRS: &[(&str, &str)] = &[
    ("variables", "variable_importances"),
    ("features", "importances"),
    ("tokens", "importances"),
];

/// Formats explanation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render according to the configured output format
    pub fn render(result: &AggregatedResult, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Summary => Self::format_summary(result, config.top_k),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format every field of every record
    pub fn format(result: &AggregatedResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Explanation Results"));
        output.push('\n');

        for (name, explanation) in result.iter() {
            output.push_str(&Self::section_header(&Self::title(name, explanation)));
            for record in explanation.records() {
                output.push_str(&format!(
                    "\n{}\n",
                    format!("── instance {} ──", record.instance_id())
                        .yellow()
                        .bold()
                ));
                for (key, value) in record.fields() {
                    output.push_str(&format!("  {} {}\n", format!("{}:", key).bold(), compact(value)));
                }
            }
        }

        Self::push_tail(&mut output, result);
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &AggregatedResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the strongest `top_k` attributions of each record
    pub fn format_summary(result: &AggregatedResult, top_k: usize) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n",
            "=== Explanation Summary ===".cyan().bold()
        ));

        for (name, explanation) in result.iter() {
            output.push_str(&format!("\n{}\n", Self::title(name, explanation).bold()));
            for record in explanation.records() {
                output.push_str(&Self::summarize_record(record, top_k));
            }
        }

        Self::push_tail(&mut output, result);

        output
    }

    /// Format the algorithms available for a domain
    pub fn format_algorithms<'a>(
        domain: DataDomain,
        descriptors: impl IntoIterator<Item = &'a AlgorithmDescriptor>,
    ) -> String {
        let mut output = Self::section_header(&format!("Algorithms for {}", domain));
        for descriptor in descriptors {
            let mut traits = Vec::new();
            if descriptor.supports_local() {
                traits.push("local");
            }
            if descriptor.supports_global() {
                traits.push("global");
            }
            if descriptor.needs_training_data() {
                traits.push("needs training data");
            }

            output.push_str(&format!(
                "  {:<14} {}\n",
                descriptor.name().green().bold(),
                descriptor.description()
            ));
            let mut detail = format!("[{}]", traits.join(", "));
            if !descriptor.aliases().is_empty() {
                detail.push_str(&format!(" aliases: {}", descriptor.aliases().join(", ")));
            }
            let modes: Vec<&str> = descriptor.modes().iter().map(|m| m.as_str()).collect();
            detail.push_str(&format!(" modes: {}", modes.join(", ")));
            output.push_str(&format!("  {:<14} {}\n", "", detail.dimmed()));
        }
        output
    }

    fn summarize_record(record: &ExplanationRecord, top_k: usize) -> String {
        let mut output = format!("  {} {}", "instance".dimmed(), record.instance_id());
        if let Some(target) = record.get("target") {
            output.push_str(&format!("  target={}", compact(target)));
        }
        if let Some(prediction) = record.get_f64("prediction") {
            output.push_str(&format!("  prediction={:.4}", prediction));
        }
        output.push('\n');

        if let Some(ranked) = ranked_attributions(record, top_k) {
            for (label, value) in ranked {
                let bar = if value >= 0.0 {
                    format!("{:+.4}", value).green()
                } else {
                    format!("{:+.4}", value).red()
                };
                output.push_str(&format!("    {:<24} {}\n", label, bar));
            }
        } else if let Some(FieldValue::Map(curves)) = record.get("curves") {
            for (feature, curve) in curves.iter().take(top_k) {
                let averages = match curve {
                    FieldValue::Map(parts) => parts.get("averages").and_then(FieldValue::as_f64_vec),
                    _ => None,
                };
                let range = averages
                    .filter(|a| !a.is_empty())
                    .map(|a| {
                        let lo = a.iter().copied().fold(f64::INFINITY, f64::min);
                        let hi = a.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                        format!("{:.4} .. {:.4}", lo, hi)
                    })
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!("    {:<24} {}\n", feature, range));
            }
        } else {
            for (key, value) in record.fields() {
                if matches!(key.as_str(), "target" | "prediction") {
                    continue;
                }
                output.push_str(&format!("    {}: {}\n", key, truncate(&compact(value), 72)));
            }
        }

        output
    }

    fn push_tail(output: &mut String, result: &AggregatedResult) {
        if let Some(predictions) = result.predictions() {
            output.push_str(&Self::section_header("Predictions"));
            for (i, row) in predictions.iter().enumerate() {
                let cells: Vec<String> = row.iter().map(|p| format!("{:.4}", p)).collect();
                output.push_str(&format!("  {:>4}  [{}]\n", i, cells.join(", ")));
            }
        }

        if !result.failures().is_empty() {
            output.push_str(&format!("\n{}\n", "Failed algorithms:".red().bold()));
            for failure in result.failures() {
                output.push_str(&format!("  * {}: {}\n", failure.algorithm, failure.error));
            }
        }
    }

    fn title(name: &str, explanation: &Explanation) -> String {
        let mut title = format!(
            "{} ({}, {} record{})",
            name,
            explanation.scope(),
            explanation.len(),
            if explanation.len() == 1 { "" } else { "s" }
        );
        if explanation.algorithm_name() != name {
            title.push_str(&format!(" via {}", explanation.algorithm_name()));
        }
        title
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &AggregatedResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &AggregatedResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &AggregatedResult, top_k: usize) -> String {
        Self::format_summary(result, top_k)
    }
}

/// The `top_k` labelled attributions of a record, strongest first.
///
/// Image records carry a grid of patch importances instead of labels; their
/// cells are labelled `patch (row, col)`.
fn ranked_attributions(record: &ExplanationRecord, top_k: usize) -> Option<Vec<(String, f64)>> {
    for (labels_key, values_key) in RANKED_PAIRS {
        let (Some(labels), Some(values)) = (
            record.get(labels_key).and_then(FieldValue::as_list),
            record.get(values_key).and_then(FieldValue::as_f64_vec),
        ) else {
            continue;
        };
        if labels.len() != values.len() {
            continue;
        }
        let labels = labels.iter().map(label_text).collect();
        return Some(top_attributions(labels, values, top_k));
    }

    let grid = record.get("importances")?.as_list()?;
    let mut labels = Vec::new();
    let mut values = Vec::new();
    for (r, row) in grid.iter().enumerate() {
        for (c, value) in row.as_f64_vec()?.into_iter().enumerate() {
            labels.push(format!("patch ({}, {})", r, c));
            values.push(value);
        }
    }
    Some(top_attributions(labels, values, top_k))
}

/// Rank by absolute value; ties keep their original order.
fn top_attributions(labels: Vec<String>, values: Vec<f64>, top_k: usize) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = labels.into_iter().zip(values).collect();
    pairs.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    pairs.truncate(top_k);
    pairs
}

fn label_text(value: &FieldValue) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => compact(value),
    }
}

fn compact(value: &FieldValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "?".to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}
