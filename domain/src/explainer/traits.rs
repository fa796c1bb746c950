//! Explainer trait and construction context

use super::params::AlgorithmParams;
use crate::core::task::{DataDomain, TaskMode};
use crate::data::{DataBatch, DataError};
use crate::explanation::{Explanation, ExplanationScope};
use crate::model::{AdapterError, PredictFn};
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by an explanation algorithm
#[derive(Error, Debug)]
pub enum ExplainerError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("{0} explanations are not supported by this algorithm")]
    Unsupported(ExplanationScope),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Explanation failed: {0}")]
    Failed(String),
}

/// Everything a factory needs to build one bound algorithm
///
/// `predict` and `training_data` are shared by every algorithm of a
/// session; cloning the context clones the `Arc`s, never the data.
#[derive(Debug, Clone)]
pub struct ExplainerContext {
    /// Canonical algorithm name
    pub name: String,
    pub domain: DataDomain,
    pub mode: TaskMode,
    pub predict: Arc<PredictFn>,
    /// Possibly empty, never absent
    pub training_data: Arc<DataBatch>,
    pub params: AlgorithmParams,
}

/// An explanation algorithm bound to one session
///
/// Implementations own their scratch state and must not mutate the shared
/// model or training data. Both methods are blocking and may run on any
/// worker thread.
///
/// `params` holds explain-time parameters for this one call. They are
/// layered key by key over the construction-time parameters in
/// [`ExplainerContext::params`] and decoded the same way; an empty bag
/// means the construction-time parameters apply unchanged.
pub trait Explainer: Send + Sync {
    /// Canonical algorithm name
    fn name(&self) -> &str;

    /// Explain each instance of `query`, one record per instance in order.
    fn explain_instances(
        &self,
        _query: &DataBatch,
        _params: &AlgorithmParams,
    ) -> Result<Explanation, ExplainerError> {
        Err(ExplainerError::Unsupported(ExplanationScope::Local))
    }

    /// Explain the model as a whole, as a single global record.
    fn explain_global(&self, _params: &AlgorithmParams) -> Result<Explanation, ExplainerError> {
        Err(ExplainerError::Unsupported(ExplanationScope::Global))
    }
}
