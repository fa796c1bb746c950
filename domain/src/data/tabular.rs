//! Tabular (numeric feature matrix) container

use super::error::DataError;
use serde::{Deserialize, Serialize};

/// A batch of numeric tabular instances with named features
///
/// Every row has exactly `feature_names.len()` values. Construction
/// (including deserialization) rejects ragged rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTabular")]
pub struct Tabular {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawTabular {
    #[serde(default)]
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TryFrom<RawTabular> for Tabular {
    type Error = DataError;

    fn try_from(raw: RawTabular) -> Result<Self, Self::Error> {
        if raw.feature_names.is_empty() {
            Tabular::from_rows(raw.rows)
        } else {
            Tabular::new(raw.feature_names, raw.rows)
        }
    }
}

impl Tabular {
    /// Creates a table with explicit feature names.
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        let expected = feature_names.len();
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(DataError::RaggedRow {
                    row,
                    expected,
                    found: values.len(),
                });
            }
        }
        Ok(Self {
            feature_names,
            rows,
        })
    }

    /// Creates a table whose features are named `x0`, `x1`, ... after the first row.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let names = (0..width).map(|i| format!("x{}", i)).collect();
        Self::new(names, rows)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-feature mean over all rows (zeros for an empty table).
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.num_features()];
        if self.rows.is_empty() {
            return means;
        }
        for row in &self.rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        let n = self.rows.len() as f64;
        means.iter_mut().for_each(|m| *m /= n);
        means
    }

    /// Returns a table with the same schema and different rows.
    ///
    /// Rows must have the same width as this table.
    pub fn with_rows(&self, rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        Self::new(self.feature_names.clone(), rows)
    }
}
