//! Linear model with an optional link function

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xplain_domain::{BoxError, ModelInput, Predictions, PredictiveModel};

/// Errors raised while validating or evaluating a [`LinearModel`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearModelError {
    #[error("Linear model has no outputs")]
    NoOutputs,

    #[error("Output {output} has {found} weights, expected {expected}")]
    RaggedWeights {
        output: usize,
        expected: usize,
        found: usize,
    },

    #[error("Bias has {found} entries, expected {expected}")]
    BiasLength { expected: usize, found: usize },

    #[error("Linear model needs numeric input, got text")]
    TextInput,

    #[error("Row {row} has {found} features, expected {expected}")]
    FeatureCount {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// How raw scores become outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    /// Raw scores (regression)
    #[default]
    Identity,
    /// Class probabilities over all outputs
    Softmax,
    /// Independent probabilities; a single output expands to `[1 - p, p]`
    Sigmoid,
}

/// `y = link(W x + b)`, one weight row per output
///
/// Loaded from JSON:
///
/// ```json
/// {"weights": [[0.5, -1.0], [-0.5, 1.0]], "bias": [0.0, 0.1], "link": "softmax"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    weights: Vec<Vec<f64>>,
    #[serde(default)]
    bias: Vec<f64>,
    #[serde(default)]
    link: Link,
}

impl LinearModel {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>, link: Link) -> Result<Self, LinearModelError> {
        let model = Self {
            weights,
            bias,
            link,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check that the weight matrix is rectangular and the bias fits.
    pub fn validate(&self) -> Result<(), LinearModelError> {
        let expected = self
            .weights
            .first()
            .map(Vec::len)
            .ok_or(LinearModelError::NoOutputs)?;
        for (output, row) in self.weights.iter().enumerate() {
            if row.len() != expected {
                return Err(LinearModelError::RaggedWeights {
                    output,
                    expected,
                    found: row.len(),
                });
            }
        }
        if !self.bias.is_empty() && self.bias.len() != self.weights.len() {
            return Err(LinearModelError::BiasLength {
                expected: self.weights.len(),
                found: self.bias.len(),
            });
        }
        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    pub fn num_outputs(&self) -> usize {
        match (self.link, self.weights.len()) {
            (Link::Sigmoid, 1) => 2,
            (_, n) => n,
        }
    }

    pub fn link(&self) -> Link {
        self.link
    }

    fn scores(&self, row: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let bias = self.bias.get(i).copied().unwrap_or(0.0);
                w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + bias
            })
            .collect()
    }

    fn apply_link(&self, scores: Vec<f64>) -> Vec<f64> {
        match self.link {
            Link::Identity => scores,
            Link::Softmax => {
                let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
                let total: f64 = exp.iter().sum();
                exp.into_iter().map(|e| e / total).collect()
            }
            Link::Sigmoid => {
                let probs: Vec<f64> = scores.iter().map(|s| 1.0 / (1.0 + (-s).exp())).collect();
                if probs.len() == 1 {
                    vec![1.0 - probs[0], probs[0]]
                } else {
                    probs
                }
            }
        }
    }

    pub fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Predictions, LinearModelError> {
        let expected = self.num_features();
        rows.iter()
            .enumerate()
            .map(|(row, values)| {
                if values.len() != expected {
                    return Err(LinearModelError::FeatureCount {
                        row,
                        expected,
                        found: values.len(),
                    });
                }
                Ok(self.apply_link(self.scores(values)))
            })
            .collect()
    }
}

impl PredictiveModel for LinearModel {
    fn predict(&self, input: &ModelInput) -> Result<Predictions, BoxError> {
        match input {
            ModelInput::Dense(rows) => Ok(self.predict_rows(rows)?),
            ModelInput::Text(_) => Err(LinearModelError::TextInput.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_link() {
        let model = LinearModel::new(vec![vec![2.0, -1.0]], vec![0.5], Link::Identity).unwrap();
        let predictions = model.predict_rows(&[vec![1.0, 1.0], vec![0.0, 2.0]]).unwrap();
        assert_eq!(predictions, vec![vec![1.5], vec![-1.5]]);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let model = LinearModel::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![],
            Link::Softmax,
        )
        .unwrap();
        let row = &model.predict_rows(&[vec![3.0, 1.0]]).unwrap()[0];
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(row[0] > row[1]);
    }

    #[test]
    fn test_single_sigmoid_expands_to_two_classes() {
        let model = LinearModel::new(vec![vec![1.0]], vec![], Link::Sigmoid).unwrap();
        assert_eq!(model.num_outputs(), 2);
        let row = &model.predict_rows(&[vec![0.0]]).unwrap()[0];
        assert_eq!(row, &vec![0.5, 0.5]);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            LinearModel::new(vec![], vec![], Link::Identity),
            Err(LinearModelError::NoOutputs)
        );
        assert!(matches!(
            LinearModel::new(vec![vec![1.0], vec![1.0, 2.0]], vec![], Link::Identity),
            Err(LinearModelError::RaggedWeights { output: 1, .. })
        ));
        assert!(matches!(
            LinearModel::new(vec![vec![1.0]], vec![1.0, 2.0], Link::Identity),
            Err(LinearModelError::BiasLength { .. })
        ));
    }

    #[test]
    fn test_rejects_text_and_wrong_width() {
        let model = LinearModel::new(vec![vec![1.0, 1.0]], vec![], Link::Identity).unwrap();
        assert!(model.predict(&ModelInput::Text(vec!["hi".into()])).is_err());
        assert!(matches!(
            model.predict_rows(&[vec![1.0]]),
            Err(LinearModelError::FeatureCount { row: 0, .. })
        ));
    }

    #[test]
    fn test_deserialize_defaults() {
        let model: LinearModel = serde_json::from_str(r#"{"weights": [[1.0, 2.0]]}"#).unwrap();
        assert_eq!(model.link(), Link::Identity);
        assert_eq!(model.num_features(), 2);
        assert!(serde_json::from_str::<LinearModel>(r#"{"weights": [[1.0]], "bais": []}"#).is_err());
    }
}
