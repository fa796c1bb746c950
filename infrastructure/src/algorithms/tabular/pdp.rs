//! Partial dependence over the training data

use crate::algorithms::common::{
    Settings, call_settings, decode_settings, fields, mean_prediction, predict_rows,
    resolve_target, tabular, target_column,
};
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, FieldValue, Fields, Tabular,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct PdpParams {
    /// Points on each feature's grid
    grid_points: usize,
    /// Restrict to these features (all when absent)
    features: Option<Vec<String>>,
    target: Option<usize>,
}

impl Default for PdpParams {
    fn default() -> Self {
        Self {
            grid_points: 10,
            features: None,
            target: None,
        }
    }
}

impl Settings for PdpParams {
    fn validate(&self) -> Result<(), ExplainerError> {
        if self.grid_points < 2 {
            return Err(ExplainerError::InvalidParameters(format!(
                "grid_points must be at least 2, got {}",
                self.grid_points
            )));
        }
        Ok(())
    }
}

impl PdpParams {
    fn feature_indices(&self, data: &Tabular) -> Result<Vec<usize>, ExplainerError> {
        match &self.features {
            None => Ok((0..data.num_features()).collect()),
            Some(names) => names
                .iter()
                .map(|name| {
                    data.feature_names()
                        .iter()
                        .position(|f| f == name)
                        .ok_or_else(|| {
                            ExplainerError::InvalidParameters(format!("unknown feature '{}'", name))
                        })
                })
                .collect(),
        }
    }

    fn grid(&self, data: &Tabular, feature: usize) -> Vec<f64> {
        let (lo, hi) = data
            .rows()
            .iter()
            .map(|r| r[feature])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            return vec![lo];
        }
        let steps = (self.grid_points - 1) as f64;
        (0..self.grid_points)
            .map(|i| lo + (hi - lo) * i as f64 / steps)
            .collect()
    }
}

/// Average target output as one feature sweeps an even grid between its
/// training minimum and maximum, all other features left as observed.
pub struct PdpExplainer {
    context: ExplainerContext,
    params: PdpParams,
}

impl PdpExplainer {
    pub const NAME: &'static str = "pdp";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Tabular, Self::NAME, Self::build)
            .requires_training_data()
            .with_scopes(false, true)
            .with_description("Partial dependence of the target output on each feature")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params: PdpParams = decode_settings(&context.params)?;
        params.feature_indices(tabular(&context.training_data, "training data")?)?;
        Ok(Box::new(Self { context, params }))
    }

    fn curve(
        &self,
        data: &Tabular,
        feature: usize,
        grid: &[f64],
        target: usize,
    ) -> Result<Vec<f64>, ExplainerError> {
        let n = data.len();
        let rows = grid
            .iter()
            .flat_map(|&value| {
                data.rows().iter().map(move |row| {
                    let mut row = row.clone();
                    row[feature] = value;
                    row
                })
            })
            .collect();
        let outputs = target_column(&predict_rows(&self.context, data, rows)?, target)?;
        Ok(outputs
            .chunks(n)
            .map(|chunk| chunk.iter().sum::<f64>() / n as f64)
            .collect())
    }
}

impl Explainer for PdpExplainer {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_global(&self, overrides: &AlgorithmParams) -> Result<Explanation, ExplainerError> {
        let params = call_settings(&self.context, &self.params, overrides)?;
        let data = tabular(&self.context.training_data, "training data")?;
        let features = params.feature_indices(data)?;
        let base = self.context.predict.predict(&self.context.training_data)?;
        let target = resolve_target(
            self.context.mode,
            params.target,
            &mean_prediction(&base),
        )?;

        let mut curves = Fields::new();
        for feature in features {
            let grid = params.grid(data, feature);
            let averages = self.curve(data, feature, &grid, target)?;
            curves.insert(
                data.feature_names()[feature].clone(),
                FieldValue::Map(fields([
                    ("grid", FieldValue::from(grid)),
                    ("averages", FieldValue::from(averages)),
                ])),
            );
        }

        Ok(Explanation::global(
            &self.context.name,
            self.context.domain,
            self.context.mode,
            fields([
                ("target", FieldValue::from(target)),
                ("curves", FieldValue::Map(curves)),
            ]),
        ))
    }
}
