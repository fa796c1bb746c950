//! Infrastructure layer for xplain
//!
//! This crate contains the built-in explanation algorithms and the
//! process-wide registry they are sealed into, a linear reference model,
//! JSON data/model file loading and configuration file loading.

pub mod algorithms;
pub mod config;
pub mod files;
pub mod model;

// Re-export commonly used types
pub use algorithms::{builtin_registry, register_builtins};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileDispatchConfig, FileOutputConfig,
    FileOutputFormat, FileSessionConfig,
};
pub use files::{LoadError, load_batch, load_batch_for, load_model};
pub use model::{LinearModel, LinearModelError, Link};
