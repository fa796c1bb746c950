//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use xplain_application::{DispatchParams, FailurePolicy};
use xplain_domain::{AlgorithmParams, DataDomain, OutputFormat, TaskMode};

// Re-export OutputFormat from domain for convenience
pub use xplain_domain::OutputFormat as FileOutputFormat;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("max_workers cannot be 0")]
    InvalidWorkers,

    #[error("explainer name cannot be empty")]
    EmptyExplainerName,

    #[error("[params.{0}] must be a table")]
    InvalidParams(String),
}

/// Raw session configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    pub domain: DataDomain,
    pub mode: TaskMode,
    /// Algorithms to run when none are given on the command line
    pub explainers: Vec<String>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            domain: DataDomain::Tabular,
            mode: TaskMode::Classification,
            explainers: Vec::new(),
        }
    }
}

/// Raw dispatch configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Concurrent explainers (default: available parallelism)
    pub max_workers: Option<usize>,
    pub failure_policy: FailurePolicy,
    /// Deadline for the whole dispatch, observed between explainers
    pub timeout_seconds: Option<u64>,
    /// Also report the model's predictions for the query
    pub run_predict: bool,
}

impl FileDispatchConfig {
    pub fn to_dispatch_params(&self) -> DispatchParams {
        let mut params = DispatchParams::default()
            .with_failure_policy(self.failure_policy)
            .with_run_predict(self.run_predict);
        if let Some(workers) = self.max_workers {
            params = params.with_max_workers(workers);
        }
        if let Some(seconds) = self.timeout_seconds {
            params = params.with_timeout(Some(Duration::from_secs(seconds)));
        }
        params
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Features shown per record in summary output
    pub top_k: usize,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            top_k: 5,
        }
    }
}

/// Complete file configuration (raw TOML structure)
///
/// ```toml
/// [session]
/// domain = "tabular"
/// mode = "classification"
/// explainers = ["sensitivity", "pdp"]
///
/// [dispatch]
/// max_workers = 4
/// failure_policy = "skip_failed"
///
/// [params.pdp]
/// grid_points = 20
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Session settings
    pub session: FileSessionConfig,
    /// Dispatch settings
    pub dispatch: FileDispatchConfig,
    /// Per-algorithm parameters, keyed by algorithm name
    pub params: BTreeMap<String, serde_json::Value>,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.dispatch.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if let Some(0) = self.dispatch.max_workers {
            return Err(ConfigValidationError::InvalidWorkers);
        }

        for name in &self.session.explainers {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyExplainerName);
            }
        }

        for (name, value) in &self.params {
            if !value.is_object() {
                return Err(ConfigValidationError::InvalidParams(name.clone()));
            }
        }

        Ok(())
    }

    /// `[params.*]` tables as algorithm parameter bags.
    pub fn algorithm_params(&self) -> Vec<(String, AlgorithmParams)> {
        self.params
            .iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::Object(map) => {
                    Some((name.clone(), AlgorithmParams::from(map.clone())))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[session]
domain = "text"
mode = "regression"
explainers = ["word_occlusion"]

[dispatch]
max_workers = 2
failure_policy = "skip_failed"
timeout_seconds = 30
run_predict = true

[params.word_occlusion]
mask_token = "[UNK]"

[output]
format = "json"
color = false
top_k = 3
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.domain, DataDomain::Text);
        assert_eq!(config.session.mode, TaskMode::Regression);
        assert_eq!(config.session.explainers, vec!["word_occlusion"]);
        assert_eq!(config.dispatch.max_workers, Some(2));
        assert_eq!(config.dispatch.failure_policy, FailurePolicy::SkipFailed);
        assert!(config.dispatch.run_predict);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(config.output.top_k, 3);

        let params = config.algorithm_params();
        assert_eq!(params.len(), 1);
        assert_eq!(
            params[0].1.get("mask_token"),
            Some(&serde_json::Value::from("[UNK]"))
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[session]
explainers = ["pdp"]
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.explainers.len(), 1);
        // Defaults should apply
        assert_eq!(config.session.domain, DataDomain::Tabular);
        assert_eq!(config.dispatch.failure_policy, FailurePolicy::FailFast);
        assert!(config.output.color);
        assert!(config.params.is_empty());
    }

    #[test]
    fn test_dispatch_params_conversion() {
        let dispatch = FileDispatchConfig {
            max_workers: Some(3),
            failure_policy: FailurePolicy::SkipFailed,
            timeout_seconds: Some(10),
            run_predict: true,
        };
        let params = dispatch.to_dispatch_params();
        assert_eq!(params.max_workers, 3);
        assert_eq!(params.failure_policy, FailurePolicy::SkipFailed);
        assert_eq!(params.timeout, Some(Duration::from_secs(10)));
        assert!(params.run_predict);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let toml_str = r#"
[dispatch]
timeout_seconds = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_validate_zero_workers() {
        let toml_str = r#"
[dispatch]
max_workers = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidWorkers)
        ));
    }

    #[test]
    fn test_validate_empty_explainer_name() {
        let toml_str = r#"
[session]
explainers = ["pdp", " "]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyExplainerName)
        ));
    }

    #[test]
    fn test_validate_params_must_be_tables() {
        let toml_str = r#"
[params]
pdp = 3
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidParams(name)) if name == "pdp"
        ));
    }
}
