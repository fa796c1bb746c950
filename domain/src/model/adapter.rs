//! Predict adapter wrapping preprocess, model and postprocess

use super::port::{BoxError, PostprocessFn, Predictions, PredictiveModel, PreprocessFn};
use crate::data::{DataBatch, ModelInput};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// The pipeline stage at which a prediction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStage {
    Preprocess,
    Model,
    Postprocess,
}

impl AdapterStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterStage::Preprocess => "preprocess",
            AdapterStage::Model => "model",
            AdapterStage::Postprocess => "postprocess",
        }
    }
}

impl std::fmt::Display for AdapterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A caller-supplied collaborator failed while predicting
#[derive(Error, Debug)]
#[error("Adapter invocation failed at {stage} stage: {source}")]
pub struct AdapterError {
    pub stage: AdapterStage,
    #[source]
    pub source: BoxError,
}

impl AdapterError {
    pub fn new(stage: AdapterStage, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Uniform `predict(raw instances) -> outputs` function shared by all
/// algorithms of one session
///
/// ```
/// use std::sync::Arc;
/// use xplain_domain::{BoxError, DataBatch, ModelInput, PredictFn, Tabular};
///
/// let model = |input: &ModelInput| -> Result<Vec<Vec<f64>>, BoxError> {
///     match input {
///         ModelInput::Dense(rows) => Ok(rows.iter().map(|r| vec![r.iter().sum()]).collect()),
///         ModelInput::Text(_) => Err("text not supported".into()),
///     }
/// };
/// let predict = PredictFn::identity(Arc::new(model));
/// let batch = DataBatch::from(Tabular::from_rows(vec![vec![1.0, 2.0]]).unwrap());
/// assert_eq!(predict.predict(&batch).unwrap(), vec![vec![3.0]]);
/// ```
pub struct PredictFn {
    model: Arc<dyn PredictiveModel>,
    preprocess: PreprocessFn,
    postprocess: PostprocessFn,
}

impl PredictFn {
    pub fn new(
        model: Arc<dyn PredictiveModel>,
        preprocess: PreprocessFn,
        postprocess: PostprocessFn,
    ) -> Self {
        Self {
            model,
            preprocess,
            postprocess,
        }
    }

    /// Adapter with identity preprocessing and postprocessing.
    pub fn identity(model: Arc<dyn PredictiveModel>) -> Self {
        Self::new(model, identity_preprocess(), identity_postprocess())
    }

    /// Run preprocess, model and postprocess on `batch`.
    ///
    /// The model must return exactly one row per instance.
    pub fn predict(&self, batch: &DataBatch) -> Result<Predictions, AdapterError> {
        let input = (self.preprocess)(batch)
            .map_err(|e| AdapterError::new(AdapterStage::Preprocess, e))?;

        let raw = self
            .model
            .predict(&input)
            .map_err(|e| AdapterError::new(AdapterStage::Model, e))?;

        if raw.len() != batch.len() {
            return Err(AdapterError::new(
                AdapterStage::Model,
                format!(
                    "model returned {} rows for {} instances",
                    raw.len(),
                    batch.len()
                ),
            ));
        }

        let output =
            (self.postprocess)(raw).map_err(|e| AdapterError::new(AdapterStage::Postprocess, e))?;

        if output.len() != batch.len() {
            return Err(AdapterError::new(
                AdapterStage::Postprocess,
                format!(
                    "postprocess returned {} rows for {} instances",
                    output.len(),
                    batch.len()
                ),
            ));
        }

        trace!(instances = batch.len(), "Predicted batch");
        Ok(output)
    }
}

impl std::fmt::Debug for PredictFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictFn").finish_non_exhaustive()
    }
}

/// Default preprocessing: the container's own model input mapping.
pub fn identity_preprocess() -> PreprocessFn {
    Arc::new(|batch: &DataBatch| -> Result<ModelInput, BoxError> { Ok(batch.to_model_input()) })
}

/// Default postprocessing: pass model outputs through unchanged.
pub fn identity_postprocess() -> PostprocessFn {
    Arc::new(|predictions: Predictions| -> Result<Predictions, BoxError> { Ok(predictions) })
}
