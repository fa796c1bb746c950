//! Timestep and variable occlusion for multivariate series

use crate::algorithms::common::{
    Settings, call_settings, check_width, decode_settings, fields, resolve_target, target_column,
    text_list, timeseries,
};
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, ExplanationBuilder, FieldValue,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct TimestepOcclusionParams {
    target: Option<usize>,
}

impl Settings for TimestepOcclusionParams {}

/// Replaces a whole timestep (and, separately, a whole variable) with the
/// training means and records the change in the target output.
pub struct TimestepOcclusionExplainer {
    context: ExplainerContext,
    params: TimestepOcclusionParams,
    baseline: Vec<f64>,
}

impl TimestepOcclusionExplainer {
    pub const NAME: &'static str = "timestep_occlusion";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Timeseries, Self::NAME, Self::build)
            .requires_training_data()
            .with_description("Output drop per timestep and per variable against training means")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params = decode_settings(&context.params)?;
        let baseline = timeseries(&context.training_data, "training data")?.variable_means();
        Ok(Box::new(Self {
            context,
            params,
            baseline,
        }))
    }
}

impl Explainer for TimestepOcclusionExplainer {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_instances(
        &self,
        query: &DataBatch,
        overrides: &AlgorithmParams,
    ) -> Result<Explanation, ExplainerError> {
        let params = call_settings(&self.context, &self.params, overrides)?;
        let series = timeseries(query, "query")?;
        check_width(series.variable_names().len(), self.baseline.len())?;
        let base = self.context.predict.predict(query)?;

        let mut builder =
            ExplanationBuilder::new(&self.context.name, self.context.domain, self.context.mode);

        for (steps, prediction) in series.instances().iter().zip(&base) {
            let target = resolve_target(self.context.mode, params.target, prediction)?;

            // One variant per timestep, then one per variable
            let mut variants = Vec::with_capacity(steps.len() + self.baseline.len());
            for t in 0..steps.len() {
                let mut masked = steps.clone();
                masked[t] = self.baseline.clone();
                variants.push(masked);
            }
            for v in 0..self.baseline.len() {
                let mut masked = steps.clone();
                for step in masked.iter_mut() {
                    step[v] = self.baseline[v];
                }
                variants.push(masked);
            }

            let batch = DataBatch::from(series.with_instances(variants)?);
            let deltas: Vec<f64> =
                target_column(&self.context.predict.predict(&batch)?, target)?
                    .into_iter()
                    .map(|o| prediction[target] - o)
                    .collect();
            let (by_timestep, by_variable) = deltas.split_at(steps.len());

            builder.add(fields([
                ("target", FieldValue::from(target)),
                ("prediction", FieldValue::from(prediction[target])),
                ("variables", text_list(series.variable_names())),
                ("importances", FieldValue::from(by_timestep.to_vec())),
                ("variable_importances", FieldValue::from(by_variable.to_vec())),
            ]));
        }

        Ok(builder.seal())
    }
}
