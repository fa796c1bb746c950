//! Presentation-level configuration
//!
//! Resolved output settings, after merging config files and CLI flags.

use serde::{Deserialize, Serialize};
use xplain_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "full", "summary", or "json"
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Features shown per record in summary output
    pub top_k: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            top_k: 5,
        }
    }
}

impl OutputConfig {
    /// Turn terminal colors off process-wide when disabled
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}
