//! Finite-difference sensitivity of the target output to each feature

use crate::algorithms::common::{
    Settings, call_settings, decode_settings, fields, predict_rows, resolve_target, tabular,
    target_column, text_list,
};
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, ExplanationBuilder, FieldValue,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct SensitivityParams {
    /// Step used for central differences
    epsilon: f64,
    /// Output column to explain; see `resolve_target`
    target: Option<usize>,
}

impl Default for SensitivityParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            target: None,
        }
    }
}

impl Settings for SensitivityParams {
    fn validate(&self) -> Result<(), ExplainerError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ExplainerError::InvalidParameters(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

pub struct SensitivityExplainer {
    context: ExplainerContext,
    params: SensitivityParams,
}

impl SensitivityExplainer {
    pub const NAME: &'static str = "sensitivity";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Tabular, Self::NAME, Self::build)
            .with_alias("gradient")
            .with_description("Central-difference gradient of the target output per feature")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params = decode_settings(&context.params)?;
        Ok(Box::new(Self { context, params }))
    }
}

impl Explainer for SensitivityExplainer {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_instances(
        &self,
        query: &DataBatch,
        overrides: &AlgorithmParams,
    ) -> Result<Explanation, ExplainerError> {
        let params = call_settings(&self.context, &self.params, overrides)?;
        let table = tabular(query, "query")?;
        let base = self.context.predict.predict(query)?;
        let eps = params.epsilon;
        let width = table.num_features();

        let mut builder =
            ExplanationBuilder::new(&self.context.name, self.context.domain, self.context.mode);

        for (row, prediction) in table.rows().iter().zip(&base) {
            let target = resolve_target(self.context.mode, params.target, prediction)?;

            // Rows 2i and 2i+1 are x + eps and x - eps along feature i
            let mut perturbed = Vec::with_capacity(2 * width);
            for i in 0..width {
                let mut up = row.clone();
                up[i] += eps;
                let mut down = row.clone();
                down[i] -= eps;
                perturbed.push(up);
                perturbed.push(down);
            }

            let outputs = target_column(&predict_rows(&self.context, table, perturbed)?, target)?;
            let gradient: Vec<f64> = outputs
                .chunks(2)
                .map(|pair| (pair[0] - pair[1]) / (2.0 * eps))
                .collect();

            builder.add(fields([
                ("target", FieldValue::from(target)),
                ("prediction", FieldValue::from(prediction[target])),
                ("features", text_list(table.feature_names())),
                ("values", FieldValue::from(row.clone())),
                ("importances", FieldValue::from(gradient)),
            ]));
        }

        Ok(builder.seal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::test_support::{context, linear, table};
    use xplain_domain::TaskMode;

    #[test]
    fn test_recovers_linear_weights() {
        let model = linear(vec![vec![2.0, -3.0]], crate::Link::Identity);
        let ctx = context(DataDomain::Tabular, TaskMode::Regression, model, None, AlgorithmParams::new());
        let explainer = SensitivityExplainer::build(ctx).unwrap();

        let explanation = explainer
            .explain_instances(&table(vec![vec![1.0, 1.0], vec![4.0, -2.0]]), &AlgorithmParams::new())
            .unwrap();
        assert_eq!(explanation.len(), 2);

        let gradient = explanation.get(1).unwrap()["importances"].as_f64_vec().unwrap();
        assert!((gradient[0] - 2.0).abs() < 1e-6);
        assert!((gradient[1] + 3.0).abs() < 1e-6);
        assert_eq!(explanation.get(1).unwrap().get_f64("prediction"), Some(14.0));
    }

    #[test]
    fn test_classification_explains_predicted_class() {
        let model = linear(vec![vec![1.0, 0.0], vec![0.0, 1.0]], crate::Link::Softmax);
        let ctx = context(DataDomain::Tabular, TaskMode::Classification, model, None, AlgorithmParams::new());
        let explainer = SensitivityExplainer::build(ctx).unwrap();

        let explanation = explainer
            .explain_instances(&table(vec![vec![0.0, 2.0]]), &AlgorithmParams::new())
            .unwrap();
        let record = explanation.get(0).unwrap();
        assert_eq!(record["target"].as_i64(), Some(1));
        let gradient = record["importances"].as_f64_vec().unwrap();
        assert!(gradient[1] > 0.0);
        assert!(gradient[0] < 0.0);
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        let model = linear(vec![vec![1.0]], crate::Link::Identity);
        let ctx = context(
            DataDomain::Tabular,
            TaskMode::Regression,
            model,
            None,
            AlgorithmParams::new().with("epsilon", 0.0),
        );
        assert!(matches!(
            SensitivityExplainer::build(ctx),
            Err(ExplainerError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_explain_time_target_override() {
        let model = linear(vec![vec![1.0, 0.0], vec![0.0, 1.0]], crate::Link::Softmax);
        let ctx = context(DataDomain::Tabular, TaskMode::Classification, model, None, AlgorithmParams::new());
        let explainer = SensitivityExplainer::build(ctx).unwrap();
        let query = table(vec![vec![0.0, 2.0]]);

        let default = explainer.explain_instances(&query, &AlgorithmParams::new()).unwrap();
        assert_eq!(default.get(0).unwrap()["target"].as_i64(), Some(1));

        let overridden = explainer
            .explain_instances(&query, &AlgorithmParams::new().with("target", 0))
            .unwrap();
        assert_eq!(overridden.get(0).unwrap()["target"].as_i64(), Some(0));

        assert!(matches!(
            explainer.explain_instances(&query, &AlgorithmParams::new().with("epsilon", -1.0)),
            Err(ExplainerError::InvalidParameters(_))
        ));
    }
}
