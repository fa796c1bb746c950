//! Domain-agnostic batch wrapper and the default model input mapping

use super::{Images, Tabular, Text, Timeseries};
use crate::core::task::DataDomain;
use serde::{Deserialize, Serialize};

/// A batch of instances from one data domain
///
/// Serialized with a `domain` tag so data files are self-describing:
///
/// ```
/// use xplain_domain::{DataBatch, DataDomain};
///
/// let batch: DataBatch = serde_json::from_str(
///     r#"{"domain":"tabular","feature_names":["age"],"rows":[[31.0],[45.0]]}"#,
/// ).unwrap();
/// assert_eq!(batch.domain(), DataDomain::Tabular);
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DataBatch {
    Tabular(Tabular),
    Text(Text),
    Image(Images),
    Timeseries(Timeseries),
}

/// What a predictive model consumes
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInput {
    /// One numeric row per instance
    Dense(Vec<Vec<f64>>),
    /// One raw string per instance
    Text(Vec<String>),
}

impl ModelInput {
    pub fn len(&self) -> usize {
        match self {
            ModelInput::Dense(rows) => rows.len(),
            ModelInput::Text(texts) => texts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DataBatch {
    /// An empty batch for `domain` (the "no training data" value).
    pub fn empty(domain: DataDomain) -> Self {
        match domain {
            DataDomain::Tabular => DataBatch::Tabular(Tabular::default()),
            DataDomain::Text => DataBatch::Text(Text::default()),
            DataDomain::Image => DataBatch::Image(Images::default()),
            DataDomain::Timeseries => DataBatch::Timeseries(Timeseries::default()),
        }
    }

    pub fn domain(&self) -> DataDomain {
        match self {
            DataBatch::Tabular(_) => DataDomain::Tabular,
            DataBatch::Text(_) => DataDomain::Text,
            DataBatch::Image(_) => DataDomain::Image,
            DataBatch::Timeseries(_) => DataDomain::Timeseries,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DataBatch::Tabular(t) => t.len(),
            DataBatch::Text(t) => t.len(),
            DataBatch::Image(i) => i.len(),
            DataBatch::Timeseries(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_tabular(&self) -> Option<&Tabular> {
        match self {
            DataBatch::Tabular(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            DataBatch::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_images(&self) -> Option<&Images> {
        match self {
            DataBatch::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_timeseries(&self) -> Option<&Timeseries> {
        match self {
            DataBatch::Timeseries(t) => Some(t),
            _ => None,
        }
    }

    /// The default preprocessing: map the container to the model's input.
    pub fn to_model_input(&self) -> ModelInput {
        match self {
            DataBatch::Tabular(t) => ModelInput::Dense(t.rows().to_vec()),
            DataBatch::Text(t) => ModelInput::Text(t.texts().to_vec()),
            DataBatch::Image(images) => ModelInput::Dense(
                images.images().iter().map(|i| i.pixels.clone()).collect(),
            ),
            DataBatch::Timeseries(ts) => ModelInput::Dense(
                ts.instances()
                    .iter()
                    .map(|steps| steps.iter().flatten().copied().collect())
                    .collect(),
            ),
        }
    }
}

impl From<Tabular> for DataBatch {
    fn from(value: Tabular) -> Self {
        DataBatch::Tabular(value)
    }
}

impl From<Text> for DataBatch {
    fn from(value: Text) -> Self {
        DataBatch::Text(value)
    }
}

impl From<Images> for DataBatch {
    fn from(value: Images) -> Self {
        DataBatch::Image(value)
    }
}

impl From<Timeseries> for DataBatch {
    fn from(value: Timeseries) -> Self {
        DataBatch::Timeseries(value)
    }
}
