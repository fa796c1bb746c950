//! Dispatch parameters: how bound explainers are executed.
//!
//! [`DispatchParams`] groups the static parameters that control how
//! [`RunExplainersUseCase`](crate::use_cases::run_explainers::RunExplainersUseCase)
//! runs the bound algorithms of a session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens when one algorithm fails during dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The whole dispatch fails and completed explanations are discarded.
    #[default]
    FailFast,
    /// Failed algorithms are logged and listed in the result's failures.
    SkipFailed,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::FailFast => "fail_fast",
            FailurePolicy::SkipFailed => "skip_failed",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(FailurePolicy::FailFast),
            "skip_failed" => Ok(FailurePolicy::SkipFailed),
            other => Err(format!("unknown failure policy: {}", other)),
        }
    }
}

/// Dispatch control parameters.
///
/// | Field | Effect |
/// |-------|--------|
/// | `max_workers` | upper bound on algorithms running at once |
/// | `failure_policy` | fail-fast or best-effort aggregation |
/// | `timeout` | deadline checked before each algorithm starts |
/// | `run_predict` | also return model predictions for the query |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchParams {
    pub max_workers: usize,
    pub failure_policy: FailurePolicy,
    pub timeout: Option<Duration>,
    pub run_predict: bool,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            max_workers: default_workers(),
            failure_policy: FailurePolicy::FailFast,
            timeout: None,
            run_predict: false,
        }
    }
}

/// Available parallelism, at least 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl DispatchParams {
    // ==================== Builder Methods ====================

    /// Zero is treated as one worker.
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_run_predict(mut self, run_predict: bool) -> Self {
        self.run_predict = run_predict;
        self
    }
}
