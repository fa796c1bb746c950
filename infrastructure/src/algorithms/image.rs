//! Patch occlusion for image classifiers

use crate::algorithms::common::{
    Settings, call_settings, decode_settings, fields, images, resolve_target, target_column,
};
use serde::Deserialize;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, ExplanationBuilder, FieldValue, Image, Images, TaskMode,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct PatchOcclusionParams {
    /// Side length of the square patch, in pixels
    patch_size: usize,
    /// Value written over every channel of the patch
    baseline: f64,
    target: Option<usize>,
}

impl Default for PatchOcclusionParams {
    fn default() -> Self {
        Self {
            patch_size: 4,
            baseline: 0.0,
            target: None,
        }
    }
}

impl Settings for PatchOcclusionParams {
    fn validate(&self) -> Result<(), ExplainerError> {
        if self.patch_size == 0 {
            return Err(ExplainerError::InvalidParameters(
                "patch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl PatchOcclusionParams {
    fn masked(&self, image: &Image, top: usize, left: usize) -> Image {
        let mut masked = image.clone();
        let size = self.patch_size;
        for row in top..(top + size).min(image.height) {
            for col in left..(left + size).min(image.width) {
                for channel in 0..image.channels {
                    masked.pixels[image.offset(row, col, channel)] = self.baseline;
                }
            }
        }
        masked
    }
}

/// Greys out one square patch at a time; the importance of a patch is the
/// drop in the class probability. Edge patches may be smaller.
pub struct PatchOcclusionExplainer {
    context: ExplainerContext,
    params: PatchOcclusionParams,
}

impl PatchOcclusionExplainer {
    pub const NAME: &'static str = "patch_occlusion";

    pub fn descriptor() -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(DataDomain::Image, Self::NAME, Self::build)
            .with_modes([TaskMode::Classification])
            .with_description("Class probability drop when an image patch is masked")
    }

    fn build(context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        let params = decode_settings(&context.params)?;
        Ok(Box::new(Self { context, params }))
    }
}

impl Explainer for PatchOcclusionExplainer {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_instances(
        &self,
        query: &DataBatch,
        overrides: &AlgorithmParams,
    ) -> Result<Explanation, ExplainerError> {
        let params = call_settings(&self.context, &self.params, overrides)?;
        let batch = images(query, "query")?;
        let base = self.context.predict.predict(query)?;
        let size = params.patch_size;

        let mut builder =
            ExplanationBuilder::new(&self.context.name, self.context.domain, self.context.mode);

        for (image, prediction) in batch.images().iter().zip(&base) {
            let target = resolve_target(self.context.mode, params.target, prediction)?;
            let grid_rows = image.height.div_ceil(size);
            let grid_cols = image.width.div_ceil(size);

            let mut variants = Vec::with_capacity(grid_rows * grid_cols);
            for r in 0..grid_rows {
                for c in 0..grid_cols {
                    variants.push(params.masked(image, r * size, c * size));
                }
            }

            let importances: Vec<f64> = if variants.is_empty() {
                Vec::new()
            } else {
                let variants = DataBatch::from(Images::new(variants)?);
                target_column(&self.context.predict.predict(&variants)?, target)?
                    .into_iter()
                    .map(|o| prediction[target] - o)
                    .collect()
            };

            builder.add(fields([
                ("target", FieldValue::from(target)),
                ("prediction", FieldValue::from(prediction[target])),
                ("patch_size", FieldValue::from(size)),
                ("grid_rows", FieldValue::from(grid_rows)),
                ("grid_cols", FieldValue::from(grid_cols)),
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
    use xplain_domain::{BoxError, ModelInput, Predictions, PredictiveModel};

    /// Two classes; class 1 probability is the top-left pixel
    fn corner_model() -> Arc<dyn PredictiveModel> {
        Arc::new(|input: &ModelInput| -> Result<Predictions, BoxError> {
            match input {
                ModelInput::Dense(rows) => Ok(rows.iter().map(|r| vec![1.0 - r[0], r[0]]).collect()),
                ModelInput::Text(_) => Err("expected pixels".into()),
            }
        })
    }

    #[test]
    fn test_only_corner_patch_matters() {
        let ctx = context(
            DataDomain::Image,
            TaskMode::Classification,
            corner_model(),
            None,
            AlgorithmParams::new().with("patch_size", 2),
        );
        let explainer = PatchOcclusionExplainer::build(ctx).unwrap();

        // 3x3 single-channel image, all 0.75: class 1 wins
        let image = Image::new(3, 3, 1, vec![0.75; 9]);
        let query = DataBatch::from(Images::new(vec![image]).unwrap());
        let explanation = explainer
            .explain_instances(&query, &AlgorithmParams::new())
            .unwrap();
        let record = explanation.get(0).unwrap();

        assert_eq!(record["target"].as_i64(), Some(1));
        assert_eq!(record["grid_rows"].as_i64(), Some(2));
        assert_eq!(
            record["importances"].as_f64_vec().unwrap(),
            vec![0.75, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_classification_only() {
        let descriptor = PatchOcclusionExplainer::descriptor();
        assert!(descriptor.supports_mode(TaskMode::Classification));
        assert!(!descriptor.supports_mode(TaskMode::Regression));
    }

    #[test]
    fn test_explain_time_patch_size() {
        let ctx = context(
            DataDomain::Image,
            TaskMode::Classification,
            corner_model(),
            None,
            AlgorithmParams::new().with("patch_size", 2),
        );
        let explainer = PatchOcclusionExplainer::build(ctx).unwrap();
        let image = Image::new(3, 3, 1, vec![0.75; 9]);
        let query = DataBatch::from(Images::new(vec![image]).unwrap());

        let explanation = explainer
            .explain_instances(&query, &AlgorithmParams::new().with("patch_size", 3))
            .unwrap();
        let record = explanation.get(0).unwrap();
        assert_eq!(record["patch_size"].as_i64(), Some(3));
        assert_eq!(record["importances"].as_f64_vec().unwrap(), vec![0.75]);

        assert!(matches!(
            explainer.explain_instances(&query, &AlgorithmParams::new().with("patch_size", 0)),
            Err(ExplainerError::InvalidParameters(_))
        ));
    }
}
