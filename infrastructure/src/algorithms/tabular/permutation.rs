//! Permutation feature importance over the training data

use crate::algorithms::common::{
    Settings, call_settings, decode_settings, fields, mean_prediction, predict_rows,
    resolve_target, tabular, target_column, text_list,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, FieldValue, Tabular,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct PermutationParams {
    n_repeats: usize,
    seed: u64,
    target: Option<usize>,
}

impl Default for PermutationParams {
    fn default() -> Self {
        Self {
            n_repeats: 5,
            seed: 0,
            target: None,
        }
    }
}

impl Settings for PermutationParams {
    fn validate(&self) -> Result<(), ExplainerError> {
        if self.n_repeats == 0 {
            return Err(ExplainerError::InvalidParameters(
                "n_repeats must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shuffles one column of the training data at a time and measures the
/// mean absolute change of the target output.
///
/// No labels are involved: the score is how much the model relies on a
/// feature, not how much accuracy it loses without it.
pub struct PermutationExplainer {
    context: ExplainerContext,
    params: PermutationParams,
}

impl PermutationExplainer {
    pub const NAME: &'static str = "permutation";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Tabular, Self::NAME, Self::build)
            .with_alias("pfi")
            .requires_training_data()
            .with_scopes(false, true)
            .with_description("Mean output change when a training column is shuffled")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params = decode_settings(&context.params)?;
        tabular(&context.training_data, "training data")?;
        Ok(Box::new(Self { context, params }))
    }

    fn training(&self) -> Result<&Tabular, ExplainerError> {
        tabular(&self.context.training_data, "training data")
    }
}

impl Explainer for PermutationExplainer {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_global(&self, overrides: &AlgorithmParams) -> Result<Explanation, ExplainerError> {
        let params = call_settings(&self.context, &self.params, overrides)?;
        let data = self.training()?;
        let base = self.context.predict.predict(&self.context.training_data)?;
        let target = resolve_target(
            self.context.mode,
            params.target,
            &mean_prediction(&base),
        )?;
        let base = target_column(&base, target)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut means = Vec::with_capacity(data.num_features());
        let mut stds = Vec::with_capacity(data.num_features());

        for feature in 0..data.num_features() {
            let mut scores = Vec::with_capacity(params.n_repeats);
            for _ in 0..params.n_repeats {
                let mut column: Vec<f64> = data.rows().iter().map(|r| r[feature]).collect();
                column.shuffle(&mut rng);

                let rows = data
                    .rows()
                    .iter()
                    .zip(&column)
                    .map(|(row, &value)| {
                        let mut row = row.clone();
                        row[feature] = value;
                        row
                    })
                    .collect();
                let permuted = target_column(&predict_rows(&self.context, data, rows)?, target)?;
                let change = base
                    .iter()
                    .zip(&permuted)
                    .map(|(b, p)| (b - p).abs())
                    .sum::<f64>()
                    / base.len().max(1) as f64;
                scores.push(change);
            }

            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            let variance =
                scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
            means.push(mean);
            stds.push(variance.sqrt());
        }

        Ok(Explanation::global(
            &self.context.name,
            self.context.domain,
            self.context.mode,
            fields([
                ("target", FieldValue::from(target)),
                ("features", text_list(data.feature_names())),
                ("importances", FieldValue::from(means)),
                ("importances_std", FieldValue::from(stds)),
                ("n_repeats", FieldValue::from(params.n_repeats)),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::test_support::{context, linear, table};
    use xplain_domain::{DataBatch, ExplanationScope, TaskMode};

    fn training() -> DataBatch {
        table(vec![
            vec![0.0, 5.0],
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![3.0, 5.0],
        ])
    }

    fn explainer(params: AlgorithmParams) -> Box<dyn Explainer> {
        let model = linear(vec![vec![1.0, 10.0]], crate::Link::Identity);
        let ctx = context(
            DataDomain::Tabular,
            TaskMode::Regression,
            model,
            Some(training()),
            params,
        );
        PermutationExplainer::build(ctx).unwrap()
    }

    #[test]
    fn test_constant_feature_has_no_importance() {
        let explanation = explainer(AlgorithmParams::new().with("seed", 7))
            .explain_global(&AlgorithmParams::new())
            .unwrap();
        assert_eq!(explanation.scope(), ExplanationScope::Global);

        let importances = explanation.get(0).unwrap()["importances"].as_f64_vec().unwrap();
        assert_eq!(importances[1], 0.0);
        assert!(importances[0] >= 0.0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let params = AlgorithmParams::new().with("seed", 42).with("n_repeats", 3);
        let first = explainer(params.clone())
            .explain_global(&AlgorithmParams::new())
            .unwrap();
        let second = explainer(params).explain_global(&AlgorithmParams::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_global_only() {
        let descriptor = PermutationExplainer::descriptor();
        assert!(descriptor.is_global_only());
        assert!(descriptor.needs_training_data());
        assert!(matches!(
            explainer(AlgorithmParams::new())
                .explain_instances(&training(), &AlgorithmParams::new()),
            Err(ExplainerError::Unsupported(ExplanationScope::Local))
        ));
    }

    #[test]
    fn test_zero_repeats_rejected() {
        let model = linear(vec![vec![1.0, 1.0]], crate::Link::Identity);
        let ctx = context(
            DataDomain::Tabular,
            TaskMode::Regression,
            model,
            Some(training()),
            AlgorithmParams::new().with("n_repeats", 0),
        );
        assert!(PermutationExplainer::build(ctx).is_err());
    }

    #[test]
    fn test_explain_time_repeats() {
        let explainer = explainer(AlgorithmParams::new().with("n_repeats", 2));
        let record = explainer
            .explain_global(&AlgorithmParams::new().with("n_repeats", 4))
            .unwrap();
        assert_eq!(record.get(0).unwrap()["n_repeats"].as_i64(), Some(4));

        let record = explainer.explain_global(&AlgorithmParams::new()).unwrap();
        assert_eq!(record.get(0).unwrap()["n_repeats"].as_i64(), Some(2));

        assert!(
            explainer
                .explain_global(&AlgorithmParams::new().with("n_repeats", 0))
                .is_err()
        );
    }
}
