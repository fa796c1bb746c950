//! Feature occlusion against a training-mean baseline

use crate::algorithms::common::{
    Settings, call_settings, check_width, decode_settings, fields, predict_rows, resolve_target,
    tabular, target_column, text_list,
};
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, ExplanationBuilder, FieldValue,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct OcclusionParams {
    target: Option<usize>,
}

impl Settings for OcclusionParams {}

/// Replaces one feature at a time with its training mean and records how
/// much the target output drops.
pub struct OcclusionExplainer {
    context: ExplainerContext,
    params: OcclusionParams,
    baseline: Vec<f64>,
}

impl OcclusionExplainer {
    pub const NAME: &'static str = "occlusion";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Tabular, Self::NAME, Self::build)
            .with_alias("ablation")
            .requires_training_data()
            .with_description("Output drop when a feature is replaced by its training mean")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params = decode_settings(&context.params)?;
        let baseline = tabular(&context.training_data, "training data")?.column_means();
        Ok(Box::new(Self {
            context,
            params,
            baseline,
        }))
    }
}

impl Explainer for OcclusionExplainer {
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
        check_width(table.num_features(), self.baseline.len())?;
        let base = self.context.predict.predict(query)?;

        let mut builder =
            ExplanationBuilder::new(&self.context.name, self.context.domain, self.context.mode);

        for (row, prediction) in table.rows().iter().zip(&base) {
            let target = resolve_target(self.context.mode, params.target, prediction)?;

            let occluded: Vec<Vec<f64>> = (0..row.len())
                .map(|i| {
                    let mut masked = row.clone();
                    masked[i] = self.baseline[i];
                    masked
                })
                .collect();
            let outputs = target_column(&predict_rows(&self.context, table, occluded)?, target)?;
            let importances: Vec<f64> = outputs.iter().map(|o| prediction[target] - o).collect();

            builder.add(fields([
                ("target", FieldValue::from(target)),
                ("prediction", FieldValue::from(prediction[target])),
                ("features", text_list(table.feature_names())),
                ("values", FieldValue::from(row.clone())),
                ("importances", FieldValue::from(importances)),
            ]));
        }

        Ok(builder.seal())
    }
}
