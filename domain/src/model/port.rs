//! Predictive model port

use crate::data::{DataBatch, ModelInput};
use std::sync::Arc;

/// Boxed error raised by caller-supplied collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Model outputs, one row per instance (class probabilities, or a single
/// regression value)
pub type Predictions = Vec<Vec<f64>>;

/// Maps raw domain containers to the model's native input
pub type PreprocessFn = Arc<dyn Fn(&DataBatch) -> Result<ModelInput, BoxError> + Send + Sync>;

/// Maps raw model outputs to the explanation-facing representation
pub type PostprocessFn = Arc<dyn Fn(Predictions) -> Result<Predictions, BoxError> + Send + Sync>;

/// An opaque prediction function
///
/// Implementations must be safe to call from several algorithm workers at
/// once; the orchestrator shares one instance across a whole session and
/// never mutates it.
pub trait PredictiveModel: Send + Sync {
    fn predict(&self, input: &ModelInput) -> Result<Predictions, BoxError>;
}

impl<F> PredictiveModel for F
where
    F: Fn(&ModelInput) -> Result<Predictions, BoxError> + Send + Sync,
{
    fn predict(&self, input: &ModelInput) -> Result<Predictions, BoxError> {
        self(input)
    }
}
