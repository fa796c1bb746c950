//! Domain layer for xplain
//!
//! This crate contains the core types of the explanation orchestrator.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Explainers
//!
//! An explanation algorithm implements [`Explainer`] and is registered in an
//! [`ExplainerRegistry`] under a `(domain, name)` key with capability flags
//! (training data required, local and/or global explanations, task modes).
//!
//! ## Predict adapter
//!
//! Algorithms never call the model directly. They call a shared
//! [`PredictFn`] that applies the session's preprocessing, the model and
//! the postprocessing, tagging failures with the stage that raised them.
//!
//! ## Explanations
//!
//! Each algorithm run yields one sealed [`Explanation`]: an ordered list of
//! [`ExplanationRecord`]s that round-trips losslessly through its JSON
//! envelope. A session's explanations are collected in an
//! [`AggregatedResult`] keyed by requested name.

pub mod config;
pub mod core;
pub mod data;
pub mod explainer;
pub mod explanation;
pub mod model;
pub mod registry;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    task::{DataDomain, TaskMode},
};
pub use data::{DataBatch, DataError, Image, Images, ModelInput, Tabular, Text, Timeseries};
pub use explainer::{AlgorithmParams, Explainer, ExplainerContext, ExplainerError};
pub use explanation::{
    AggregatedResult, AlgorithmFailure, Explanation, ExplanationBuilder, ExplanationRecord,
    ExplanationScope, FieldValue, Fields, InstanceId, PayloadError,
};
pub use model::{
    AdapterError, AdapterStage, BoxError, PostprocessFn, Predictions, PredictFn, PredictiveModel,
    PreprocessFn,
    adapter::{identity_postprocess, identity_preprocess},
};
pub use registry::{
    AlgorithmDescriptor, ExplainerFactory, ExplainerRegistry, RegistryBuilder, RegistryError,
};
