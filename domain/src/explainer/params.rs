//! Loosely-typed per-algorithm parameters

use super::traits::ExplainerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed parameter bag for one algorithm
///
/// The orchestrator passes it through untouched; each algorithm decodes
/// it into its own typed parameters with [`decode`](Self::decode).
///
/// ```
/// use serde::Deserialize;
/// use xplain_domain::AlgorithmParams;
///
/// #[derive(Deserialize)]
/// struct Params { num_samples: usize }
///
/// let params = AlgorithmParams::new().with("num_samples", 50);
/// let decoded: Params = params.decode().unwrap();
/// assert_eq!(decoded.num_samples, 50);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmParams(Map<String, Value>);

impl AlgorithmParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one parameter (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A copy of this bag with every key of `overrides` replacing its own.
    pub fn merged(&self, overrides: &AlgorithmParams) -> AlgorithmParams {
        let mut merged = self.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// Decode the bag into an algorithm's typed parameters.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ExplainerError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ExplainerError::InvalidParameters(e.to_string()))
    }
}

impl From<Map<String, Value>> for AlgorithmParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
