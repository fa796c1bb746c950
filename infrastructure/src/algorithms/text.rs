//! Word occlusion for text classifiers and regressors

use crate::algorithms::common::{
    Settings, call_settings, decode_settings, fields, resolve_target, target_column, text,
};
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, ExplanationBuilder, FieldValue, Text,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct WordOcclusionParams {
    /// Replacement for the occluded word; empty drops it
    mask_token: String,
    target: Option<usize>,
}

impl Settings for WordOcclusionParams {}

impl WordOcclusionParams {
    fn variants(&self, tokens: &[&str]) -> Vec<String> {
        (0..tokens.len())
            .map(|skip| {
                tokens
                    .iter()
                    .enumerate()
                    .filter_map(|(i, token)| {
                        if i != skip {
                            Some(*token)
                        } else if self.mask_token.is_empty() {
                            None
                        } else {
                            Some(self.mask_token.as_str())
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

/// Removes (or masks) one whitespace-separated word at a time and records
/// the change in the target output.
pub struct WordOcclusionExplainer {
    context: ExplainerContext,
    params: WordOcclusionParams,
}

impl WordOcclusionExplainer {
    pub const NAME: &'static str = "word_occlusion";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Text, Self::NAME, Self::build)
            .with_description("Output drop when a word is removed from the text")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params = decode_settings(&context.params)?;
        Ok(Box::new(Self { context, params }))
    }
}

impl Explainer for WordOcclusionExplainer {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_instances(
        &self,
        query: &DataBatch,
        overrides: &AlgorithmParams,
    ) -> Result<Explanation, ExplainerError> {
        let params = call_settings(&self.context, &self.params, overrides)?;
        let texts = text(query, "query")?;
        let base = self.context.predict.predict(query)?;

        let mut builder =
            ExplanationBuilder::new(&self.context.name, self.context.domain, self.context.mode);

        for (index, prediction) in base.iter().enumerate() {
            let target = resolve_target(self.context.mode, params.target, prediction)?;
            let tokens = texts.tokens(index);

            let importances: Vec<f64> = if tokens.is_empty() {
                Vec::new()
            } else {
                let variants = DataBatch::from(Text::new(params.variants(&tokens)));
                target_column(&self.context.predict.predict(&variants)?, target)?
                    .into_iter()
                    .map(|o| prediction[target] - o)
                    .collect()
            };

            builder.add(fields([
                ("target", FieldValue::from(target)),
                ("prediction", FieldValue::from(prediction[target])),
                ("tokens", FieldValue::from(tokens)),
                ("importances", FieldValue::from(importances)),
            ]));
        }

        Ok(builder.seal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::test_support::context;
    use std::sync::Arc;
    use xplain_domain::{BoxError, ModelInput, Predictions, PredictiveModel, TaskMode};

    /// Scores the number of times "good" appears
    fn keyword_model() -> Arc<dyn PredictiveModel> {
        Arc::new(|input: &ModelInput| -> Result<Predictions, BoxError> {
            match input {
                ModelInput::Text(texts) => Ok(texts
                    .iter()
                    .map(|t| vec![t.split_whitespace().filter(|w| *w == "good").count() as f64])
                    .collect()),
                ModelInput::Dense(_) => Err("expected text".into()),
            }
        })
    }

    #[test]
    fn test_keyword_gets_the_credit() {
        let ctx = context(
            DataDomain::Text,
            TaskMode::Regression,
            keyword_model(),
            None,
            AlgorithmParams::new(),
        );
        let explainer = WordOcclusionExplainer::build(ctx).unwrap();
        let query = DataBatch::from(Text::new(["a good movie", ""]));

        let explanation = explainer
            .explain_instances(&query, &AlgorithmParams::new())
            .unwrap();
        assert_eq!(explanation.len(), 2);

        let first = explanation.get(0).unwrap();
        assert_eq!(first["importances"].as_f64_vec().unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(first["tokens"].as_list().map(|t| t.len()), Some(3));

        // Empty text still yields a record, with nothing to attribute
        let second = explanation.get(1).unwrap();
        assert_eq!(second["importances"].as_f64_vec().unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_mask_token() {
        let ctx = context(
            DataDomain::Text,
            TaskMode::Regression,
            keyword_model(),
            None,
            AlgorithmParams::new().with("mask_token", "good"),
        );
        let explainer = WordOcclusionExplainer::build(ctx).unwrap();
        let query = DataBatch::from(Text::new(["bad film"]));
        let explanation = explainer
            .explain_instances(&query, &AlgorithmParams::new())
            .unwrap();
        // Masking with the keyword raises the score
        assert_eq!(
            explanation.get(0).unwrap()["importances"].as_f64_vec().unwrap(),
            vec![-1.0, -1.0]
        );
    }

    #[test]
    fn test_explain_time_mask_token() {
        let ctx = context(
            DataDomain::Text,
            TaskMode::Regression,
            keyword_model(),
            None,
            AlgorithmParams::new(),
        );
        let explainer = WordOcclusionExplainer::build(ctx).unwrap();
        let query = DataBatch::from(Text::new(["bad film"]));

        let masked = explainer
            .explain_instances(&query, &AlgorithmParams::new().with("mask_token", "good"))
            .unwrap();
        assert_eq!(
            masked.get(0).unwrap()["importances"].as_f64_vec().unwrap(),
            vec![-1.0, -1.0]
        );

        // The override does not stick to later calls
        let dropped = explainer
            .explain_instances(&query, &AlgorithmParams::new())
            .unwrap();
        assert_eq!(
            dropped.get(0).unwrap()["importances"].as_f64_vec().unwrap(),
            vec![0.0, 0.0]
        );
    }
}
