//! The explanation container and its textual encoding

use super::record::{ExplanationRecord, Fields, InstanceId};
use crate::core::task::{DataDomain, TaskMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Encoding or decoding an explanation payload failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Malformed explanation payload: {0}")]
    Malformed(String),

    #[error("Failed to encode explanation: {0}")]
    Encode(String),
}

/// Whether an explanation covers query instances or the whole model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationScope {
    Local,
    Global,
}

impl std::fmt::Display for ExplanationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExplanationScope::Local => write!(f, "local"),
            ExplanationScope::Global => write!(f, "global"),
        }
    }
}

/// Records appended while one algorithm invocation runs
///
/// Instance ids are assigned in insertion order, so the n-th record added
/// explains the n-th query instance. [`seal`](Self::seal) turns the
/// builder into an immutable [`Explanation`].
#[derive(Debug)]
pub struct ExplanationBuilder {
    algorithm_name: String,
    domain: DataDomain,
    mode: TaskMode,
    records: Vec<ExplanationRecord>,
}

impl ExplanationBuilder {
    pub fn new(algorithm_name: impl Into<String>, domain: DataDomain, mode: TaskMode) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            domain,
            mode,
            records: Vec::new(),
        }
    }

    /// Append the explanation of the next query instance.
    pub fn add(&mut self, fields: Fields) -> &mut Self {
        let id = InstanceId::Index(self.records.len());
        self.records.push(ExplanationRecord::new(id, fields));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn seal(self) -> Explanation {
        Explanation {
            algorithm_name: self.algorithm_name,
            domain: self.domain,
            mode: self.mode,
            records: self.records,
        }
    }
}

/// The sealed result of one algorithm invocation
///
/// Holds one record per query instance in query order, or a single
/// record with [`InstanceId::Global`] for model-level explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExplanation")]
pub struct Explanation {
    algorithm_name: String,
    domain: DataDomain,
    mode: TaskMode,
    records: Vec<ExplanationRecord>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExplanation {
    algorithm_name: String,
    domain: DataDomain,
    mode: TaskMode,
    records: Vec<ExplanationRecord>,
}

impl TryFrom<RawExplanation> for Explanation {
    type Error = PayloadError;

    fn try_from(raw: RawExplanation) -> Result<Self, Self::Error> {
        let explanation = Explanation {
            algorithm_name: raw.algorithm_name,
            domain: raw.domain,
            mode: raw.mode,
            records: raw.records,
        };
        explanation.validate()?;
        Ok(explanation)
    }
}

impl Explanation {
    /// A model-level explanation made of exactly one `global` record.
    pub fn global(
        algorithm_name: impl Into<String>,
        domain: DataDomain,
        mode: TaskMode,
        fields: Fields,
    ) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            domain,
            mode,
            records: vec![ExplanationRecord::new(InstanceId::Global, fields)],
        }
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    pub fn domain(&self) -> DataDomain {
        self.domain
    }

    pub fn mode(&self) -> TaskMode {
        self.mode
    }

    pub fn records(&self) -> &[ExplanationRecord] {
        &self.records
    }

    /// The record at position `index`.
    pub fn get(&self, index: usize) -> Option<&ExplanationRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn scope(&self) -> ExplanationScope {
        if self.records.iter().any(|r| r.instance_id().is_global()) {
            ExplanationScope::Global
        } else {
            ExplanationScope::Local
        }
    }

    /// Canonical JSON encoding.
    pub fn to_text(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(|e| PayloadError::Encode(e.to_string()))
    }

    /// Indented JSON encoding, for humans. Decodes with [`from_text`](Self::from_text)
    /// but is not the canonical form.
    pub fn to_text_pretty(&self) -> Result<String, PayloadError> {
        serde_json::to_string_pretty(self).map_err(|e| PayloadError::Encode(e.to_string()))
    }

    /// Decode a payload produced by [`to_text`](Self::to_text).
    ///
    /// Missing keys, unknown keys, wrong value types and inconsistent
    /// instance ids all fail; no partially-built container is returned.
    pub fn from_text(text: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(text).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Check the record layout against what a dispatch expects:
    /// `Some(n)` means one record per query instance, `None` a single
    /// global record.
    ///
    /// Records holding a NaN or infinite number are rejected as well, since
    /// they have no textual encoding.
    pub fn check_shape(&self, expected_instances: Option<usize>) -> Result<(), String> {
        self.check_layout(expected_instances)?;
        for record in &self.records {
            if let Some((key, _)) = record.fields().iter().find(|(_, v)| !v.is_finite()) {
                return Err(format!(
                    "record {} field '{}' holds a non-finite number",
                    record.instance_id(),
                    key
                ));
            }
        }
        Ok(())
    }

    fn check_layout(&self, expected_instances: Option<usize>) -> Result<(), String> {
        match expected_instances {
            Some(n) => {
                if self.scope() == ExplanationScope::Global {
                    return Err("expected per-instance records, got a global record".to_string());
                }
                if self.records.len() != n {
                    return Err(format!(
                        "expected {} records (one per query instance), got {}",
                        n,
                        self.records.len()
                    ));
                }
                Ok(())
            }
            None => {
                if self.records.len() == 1 && self.scope() == ExplanationScope::Global {
                    Ok(())
                } else {
                    Err(format!(
                        "expected exactly one global record, got {} {} records",
                        self.records.len(),
                        self.scope()
                    ))
                }
            }
        }
    }

    fn validate(&self) -> Result<(), PayloadError> {
        if self.algorithm_name.trim().is_empty() {
            return Err(PayloadError::Malformed(
                "algorithm_name must not be empty".to_string(),
            ));
        }

        let globals = self
            .records
            .iter()
            .filter(|r| r.instance_id().is_global())
            .count();
        if globals > 0 {
            if self.records.len() != 1 {
                return Err(PayloadError::Malformed(format!(
                    "a global record must be the only record, found {} records",
                    self.records.len()
                )));
            }
            return Ok(());
        }

        for (position, record) in self.records.iter().enumerate() {
            if record.instance_id() != InstanceId::Index(position) {
                return Err(PayloadError::Malformed(format!(
                    "record {} has instance_id {}, expected {}",
                    position,
                    record.instance_id(),
                    position
                )));
            }
        }
        Ok(())
    }
}
