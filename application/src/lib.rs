//! Application layer for xplain
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DispatchParams, FailurePolicy, default_workers};
pub use ports::progress::{NoProgress, ProgressNotifier};
pub use use_cases::auto_explainer::{AutoExplainer, AutoExplainerBuilder};
pub use use_cases::build_explainers::{
    BoundExplainer, BoundExplainers, BuildExplainersError, BuildExplainersInput,
    BuildExplainersUseCase,
};
pub use use_cases::run_explainers::{RunExplainersError, RunExplainersUseCase};
pub use tokio_util::sync::CancellationToken;
