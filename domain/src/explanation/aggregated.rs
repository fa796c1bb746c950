//! Aggregated result of one explain session

use super::container::Explanation;
use crate::model::Predictions;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An algorithm that failed under a best-effort dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmFailure {
    pub algorithm: String,
    pub error: String,
}

/// Explanations keyed by the algorithm names the caller requested
///
/// Iteration order is request order, independent of completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedResult {
    #[serde(serialize_with = "serialize_ordered")]
    explanations: Vec<(String, Explanation)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    predictions: Option<Predictions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<AlgorithmFailure>,
}

fn serialize_ordered<S>(entries: &[(String, Explanation)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, explanation) in entries {
        map.serialize_entry(name, explanation)?;
    }
    map.end()
}

impl AggregatedResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the explanation for `name`, replacing an earlier one in place.
    pub fn insert(&mut self, name: impl Into<String>, explanation: Explanation) {
        let name = name.into();
        match self.explanations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = explanation,
            None => self.explanations.push((name, explanation)),
        }
    }

    pub fn with_predictions(mut self, predictions: Predictions) -> Self {
        self.predictions = Some(predictions);
        self
    }

    pub fn add_failure(&mut self, algorithm: impl Into<String>, error: impl Into<String>) {
        self.failures.push(AlgorithmFailure {
            algorithm: algorithm.into(),
            error: error.into(),
        });
    }

    /// The explanation produced for `name`, if it was requested and succeeded.
    pub fn get_explanations(&self, name: &str) -> Option<&Explanation> {
        self.explanations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.explanations.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Explanation)> {
        self.explanations.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.explanations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explanations.is_empty()
    }

    /// Model predictions for the query, when the session ran them.
    pub fn predictions(&self) -> Option<&Predictions> {
        self.predictions.as_ref()
    }

    /// Algorithms skipped by a best-effort dispatch.
    pub fn failures(&self) -> &[AlgorithmFailure] {
        &self.failures
    }
}

impl std::ops::Index<&str> for AggregatedResult {
    type Output = Explanation;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get_explanations(name) {
            Some(explanation) => explanation,
            None => panic!("no explanation for algorithm '{}'", name),
        }
    }
}
