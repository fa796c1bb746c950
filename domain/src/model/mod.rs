//! The predictive model port and the predict adapter
//!
//! ```text
//! DataBatch ──preprocess──▶ ModelInput ──model──▶ Predictions ──postprocess──▶ Predictions
//! ```
//!
//! Every algorithm sees the model only through [`PredictFn`], so a session
//! applies the same preprocessing and postprocessing everywhere.

pub mod adapter;
pub mod port;

pub use adapter::{AdapterError, AdapterStage, PredictFn};
pub use port::{BoxError, PostprocessFn, Predictions, PredictiveModel, PreprocessFn};
