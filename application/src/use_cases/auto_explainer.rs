//! AutoExplainer facade
//!
//! One session: a model, its adapters, optional training data and a set of
//! named algorithms, built once and explained as many times as needed.

use crate::config::DispatchParams;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::build_explainers::{
    BoundExplainers, BuildExplainersError, BuildExplainersInput, BuildExplainersUseCase,
};
use crate::use_cases::run_explainers::{RunExplainersError, RunExplainersUseCase};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use xplain_domain::{
    AdapterError, AggregatedResult, AlgorithmParams, DataBatch, DataDomain, ExplainerRegistry,
    PostprocessFn, Predictions, PredictiveModel, PreprocessFn, TaskMode,
};

/// A bound explanation session
///
/// ```ignore
/// let explainer = AutoExplainer::builder(["sensitivity", "pdp"], DataDomain::Tabular,
///         TaskMode::Classification, model)
///     .with_training_data(train)
///     .build(builtin_registry()?)?;
/// let result = explainer.explain(Some(query), None).await?;
///
/// // Per-call overrides, layered over the build-time parameters
/// let tuned = HashMap::from([("pdp".to_string(), AlgorithmParams::new().with("grid_points", 20))]);
/// let result = explainer.explain(None, Some(&tuned)).await?;
/// let first = result.get_explanations("sensitivity").and_then(|e| e.get(0));
/// ```
#[derive(Debug)]
pub struct AutoExplainer {
    bound: BoundExplainers,
    dispatch: RunExplainersUseCase,
}

impl AutoExplainer {
    pub fn builder<I, S>(
        explainers: I,
        domain: DataDomain,
        mode: TaskMode,
        model: Arc<dyn PredictiveModel>,
    ) -> AutoExplainerBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AutoExplainerBuilder {
            input: BuildExplainersInput::new(explainers, domain, mode, model),
            dispatch: DispatchParams::default(),
        }
    }

    pub fn domain(&self) -> DataDomain {
        self.bound.domain
    }

    pub fn mode(&self) -> TaskMode {
        self.bound.mode
    }

    /// Requested names, in request order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bound.names()
    }

    pub fn dispatch_params(&self) -> &DispatchParams {
        self.dispatch.params()
    }

    /// Run every algorithm. A `None` query runs global explanations only.
    ///
    /// `params` holds explain-time parameters keyed by requested or canonical
    /// name; they apply to this call only.
    pub async fn explain(
        &self,
        query: Option<DataBatch>,
        params: Option<&HashMap<String, AlgorithmParams>>,
    ) -> Result<AggregatedResult, RunExplainersError> {
        self.explain_with_progress(query, params, &NoProgress, CancellationToken::new())
            .await
    }

    pub async fn explain_with_progress(
        &self,
        query: Option<DataBatch>,
        params: Option<&HashMap<String, AlgorithmParams>>,
        progress: &dyn ProgressNotifier,
        cancellation: CancellationToken,
    ) -> Result<AggregatedResult, RunExplainersError> {
        let none = HashMap::new();
        self.dispatch
            .execute_with_progress(
                &self.bound,
                query,
                params.unwrap_or(&none),
                progress,
                cancellation,
            )
            .await
    }

    /// Predictions of the wrapped model through the session's adapters.
    pub fn predict(&self, batch: &DataBatch) -> Result<Predictions, AdapterError> {
        self.bound.predict.predict(batch)
    }
}

/// Collects the session inputs for [`AutoExplainer`]
pub struct AutoExplainerBuilder {
    input: BuildExplainersInput,
    dispatch: DispatchParams,
}

impl AutoExplainerBuilder {
    // ==================== Builder Methods ====================

    pub fn with_training_data(mut self, data: DataBatch) -> Self {
        self.input = self.input.with_training_data(data);
        self
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessFn) -> Self {
        self.input = self.input.with_preprocess(preprocess);
        self
    }

    pub fn with_postprocess(mut self, postprocess: PostprocessFn) -> Self {
        self.input = self.input.with_postprocess(postprocess);
        self
    }

    pub fn with_params(mut self, name: impl Into<String>, params: AlgorithmParams) -> Self {
        self.input = self.input.with_params(name, params);
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchParams) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Resolve and construct every algorithm, or nothing.
    pub fn build(self, registry: &ExplainerRegistry) -> Result<AutoExplainer, BuildExplainersError> {
        let bound = BuildExplainersUseCase::new(registry).execute(self.input)?;
        Ok(AutoExplainer {
            bound,
            dispatch: RunExplainersUseCase::new(self.dispatch),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::use_cases::test_support::{constant_model, stub_registry, tabular_batch};
    use xplain_domain::{AdapterStage, BoxError, Explanation, FieldValue, ModelInput};

    fn session(names: &[&str]) -> AutoExplainerBuilder {
        AutoExplainer::builder(
            names.iter().copied(),
            DataDomain::Tabular,
            TaskMode::Classification,
            constant_model(),
        )
    }

    #[tokio::test]
    async fn test_result_keys_match_request() {
        let registry = stub_registry();
        let explainer = session(&["stubB", "global_stub", "stubA"])
            .with_training_data(tabular_batch(3))
            .build(&registry)
            .unwrap();

        let result = explainer.explain(Some(tabular_batch(3)), None).await.unwrap();
        assert_eq!(
            result.names().collect::<Vec<_>>(),
            explainer.names().collect::<Vec<_>>()
        );

        let record = result.get_explanations("stubA").unwrap().get(1).unwrap();
        assert_eq!(record["score"], FieldValue::Float(1.0));
    }

    #[tokio::test]
    async fn test_explanations_survive_text_round_trip() {
        let registry = stub_registry();
        let explainer = session(&["stubA", "global_stub"]).build(&registry).unwrap();
        let result = explainer.explain(Some(tabular_batch(2)), None).await.unwrap();

        for (_, explanation) in result.iter() {
            let text = explanation.to_text().unwrap();
            let decoded = Explanation::from_text(&text).unwrap();
            assert_eq!(&decoded, explanation);
            assert_eq!(decoded.to_text().unwrap(), text);
        }
    }

    #[tokio::test]
    async fn test_explain_twice() {
        let registry = stub_registry();
        let explainer = session(&["stubA"]).build(&registry).unwrap();
        let first = explainer.explain(Some(tabular_batch(1)), None).await.unwrap();
        let second = explainer.explain(Some(tabular_batch(4)), None).await.unwrap();
        assert_eq!(first["stubA"].len(), 1);
        assert_eq!(second["stubA"].len(), 4);
    }

    #[tokio::test]
    async fn test_failing_preprocess_is_stage_tagged() {
        let registry = stub_registry();
        let preprocess: PreprocessFn =
            Arc::new(|_: &DataBatch| -> Result<ModelInput, BoxError> {
                Err("bad encoding".into())
            });
        let explainer = session(&["stubA"])
            .with_preprocess(preprocess)
            .with_dispatch(DispatchParams::default().with_failure_policy(FailurePolicy::FailFast))
            .build(&registry)
            .unwrap();

        let err = explainer.explain(Some(tabular_batch(1)), None).await.unwrap_err();
        match err {
            RunExplainersError::PartialExplanation { algorithm, source } => {
                assert_eq!(algorithm, "stubA");
                match source {
                    xplain_domain::ExplainerError::Adapter(adapter) => {
                        assert_eq!(adapter.stage, AdapterStage::Preprocess)
                    }
                    other => panic!("unexpected source: {other}"),
                }
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_predict_uses_postprocess() {
        let registry = stub_registry();
        let postprocess: PostprocessFn = Arc::new(|p: Predictions| -> Result<Predictions, BoxError> {
            Ok(p.into_iter().map(|row| vec![row[1]]).collect())
        });
        let explainer = session(&["stubA"])
            .with_postprocess(postprocess)
            .build(&registry)
            .unwrap();

        let predictions = explainer.predict(&tabular_batch(2)).unwrap();
        assert_eq!(predictions, vec![vec![0.7], vec![0.7]]);
    }

    #[tokio::test]
    async fn test_explain_time_params_layer_over_build_time() {
        let registry = stub_registry();
        let explainer = session(&["stubA"])
            .with_params("stubA", AlgorithmParams::new().with("score", 2.0))
            .build(&registry)
            .unwrap();

        let tuned = HashMap::from([(
            "stubA".to_string(),
            AlgorithmParams::new().with("score", 4.0),
        )]);
        let result = explainer
            .explain(Some(tabular_batch(1)), Some(&tuned))
            .await
            .unwrap();
        assert_eq!(result["stubA"].get(0).unwrap().get_f64("score"), Some(4.0));

        let result = explainer.explain(Some(tabular_batch(1)), None).await.unwrap();
        assert_eq!(result["stubA"].get(0).unwrap().get_f64("score"), Some(2.0));
    }
}
