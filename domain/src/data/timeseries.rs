//! Multivariate timeseries container

use super::error::DataError;
use serde::{Deserialize, Serialize};

/// A batch of multivariate series, indexed `[instance][timestep][variable]`
///
/// Instances may have different lengths, but every timestep carries one
/// value per variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeseries")]
pub struct Timeseries {
    variable_names: Vec<String>,
    instances: Vec<Vec<Vec<f64>>>,
}

#[derive(Deserialize)]
struct RawTimeseries {
    variable_names: Vec<String>,
    instances: Vec<Vec<Vec<f64>>>,
}

impl TryFrom<RawTimeseries> for Timeseries {
    type Error = DataError;

    fn try_from(raw: RawTimeseries) -> Result<Self, Self::Error> {
        Timeseries::new(raw.variable_names, raw.instances)
    }
}

impl Timeseries {
    pub fn new(
        variable_names: Vec<String>,
        instances: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self, DataError> {
        let expected = variable_names.len();
        for (instance, steps) in instances.iter().enumerate() {
            for (timestep, values) in steps.iter().enumerate() {
                if values.len() != expected {
                    return Err(DataError::RaggedTimestep {
                        instance,
                        timestep,
                        expected,
                        found: values.len(),
                    });
                }
            }
        }
        Ok(Self {
            variable_names,
            instances,
        })
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn instances(&self) -> &[Vec<Vec<f64>>] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Per-variable mean across every timestep of every instance.
    pub fn variable_means(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.variable_names.len()];
        let mut count = 0usize;
        for step in self.instances.iter().flatten() {
            for (s, v) in sums.iter_mut().zip(step) {
                *s += v;
            }
            count += 1;
        }
        if count > 0 {
            sums.iter_mut().for_each(|s| *s /= count as f64);
        }
        sums
    }

    /// Returns a batch with the same variables and different instances.
    pub fn with_instances(&self, instances: Vec<Vec<Vec<f64>>>) -> Result<Self, DataError> {
        Self::new(self.variable_names.clone(), instances)
    }
}
