//! JSON data and model files
//!
//! Data files are [`DataBatch`] documents tagged with their domain:
//!
//! ```json
//! {"domain": "tabular", "feature_names": ["age", "income"], "rows": [[31, 52000]]}
//! ```
//!
//! Model files hold a [`LinearModel`].

use crate::model::{LinearModel, LinearModelError};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use xplain_domain::{DataBatch, DataDomain};

/// Errors raised while loading a data or model file
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} holds {found} data, expected {expected}")]
    Domain {
        path: PathBuf,
        expected: DataDomain,
        found: DataDomain,
    },

    #[error("Invalid model in {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: LinearModelError,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a data batch, whatever its domain.
pub fn load_batch(path: &Path) -> Result<DataBatch, LoadError> {
    let batch: DataBatch = read_json(path)?;
    debug!(
        path = %path.display(),
        domain = %batch.domain(),
        instances = batch.len(),
        "Loaded data file"
    );
    Ok(batch)
}

/// Load a data batch and check it belongs to `domain`.
pub fn load_batch_for(path: &Path, domain: DataDomain) -> Result<DataBatch, LoadError> {
    let batch = load_batch(path)?;
    if batch.domain() != domain {
        return Err(LoadError::Domain {
            path: path.to_path_buf(),
            expected: domain,
            found: batch.domain(),
        });
    }
    Ok(batch)
}

/// Load and validate a linear model.
pub fn load_model(path: &Path) -> Result<LinearModel, LoadError> {
    let model: LinearModel = read_json(path)?;
    model.validate().map_err(|source| LoadError::Model {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        features = model.num_features(),
        outputs = model.num_outputs(),
        "Loaded model file"
    );
    Ok(model)
}
