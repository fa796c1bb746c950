//! Build Explainers use case
//!
//! Resolves requested algorithm names against the registry, validates the
//! session inputs and constructs one bound instance per name, all sharing
//! a single predict adapter and a single copy of the training data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, ExplainerRegistry, PostprocessFn, PredictFn, PredictiveModel, PreprocessFn,
    RegistryError, TaskMode, identity_postprocess, identity_preprocess,
};

/// Errors that can occur while building explainers
#[derive(Error, Debug)]
pub enum BuildExplainersError {
    #[error("No explainers requested")]
    NoExplainers,

    #[error("Explainer '{0}' requested more than once")]
    DuplicateRequest(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Explainer '{algorithm}' requires training data, but none was provided")]
    MissingTrainingData { algorithm: String },

    #[error("Training data is {found} data, but the session explains {expected} data")]
    TrainingDataDomain {
        expected: DataDomain,
        found: DataDomain,
    },

    #[error("Failed to construct explainer '{algorithm}': {source}")]
    Construction {
        algorithm: String,
        #[source]
        source: ExplainerError,
    },
}

/// Input for the BuildExplainers use case
pub struct BuildExplainersInput {
    /// Requested algorithm names or aliases, in request order
    pub explainers: Vec<String>,
    pub domain: DataDomain,
    pub mode: TaskMode,
    pub model: Arc<dyn PredictiveModel>,
    /// `None` is the same as an empty batch
    pub training_data: Option<DataBatch>,
    pub preprocess: Option<PreprocessFn>,
    pub postprocess: Option<PostprocessFn>,
    /// Parameters keyed by requested name (or canonical name)
    pub params: HashMap<String, AlgorithmParams>,
}

impl BuildExplainersInput {
    pub fn new<I, S>(
        explainers: I,
        domain: DataDomain,
        mode: TaskMode,
        model: Arc<dyn PredictiveModel>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            explainers: explainers.into_iter().map(Into::into).collect(),
            domain,
            mode,
            model,
            training_data: None,
            preprocess: None,
            postprocess: None,
            params: HashMap::new(),
        }
    }

    pub fn with_training_data(mut self, data: DataBatch) -> Self {
        self.training_data = Some(data);
        self
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessFn) -> Self {
        self.preprocess = Some(preprocess);
        self
    }

    pub fn with_postprocess(mut self, postprocess: PostprocessFn) -> Self {
        self.postprocess = Some(postprocess);
        self
    }

    pub fn with_params(mut self, name: impl Into<String>, params: AlgorithmParams) -> Self {
        self.params.insert(name.into(), params);
        self
    }
}

/// One algorithm instance bound to a session
#[derive(Clone)]
pub struct BoundExplainer {
    /// The name the caller asked for (key of the aggregated result)
    pub requested_name: String,
    pub descriptor: AlgorithmDescriptor,
    pub explainer: Arc<dyn Explainer>,
}

impl std::fmt::Debug for BoundExplainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundExplainer")
            .field("requested_name", &self.requested_name)
            .field("algorithm", &self.descriptor.name())
            .finish()
    }
}

/// All bound algorithms of one session, in request order
#[derive(Debug, Clone)]
pub struct BoundExplainers {
    pub domain: DataDomain,
    pub mode: TaskMode,
    pub predict: Arc<PredictFn>,
    pub entries: Vec<BoundExplainer>,
}

impl BoundExplainers {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.requested_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Use case for instantiating the requested explainers
pub struct BuildExplainersUseCase<'a> {
    registry: &'a ExplainerRegistry,
}

impl<'a> BuildExplainersUseCase<'a> {
    pub fn new(registry: &'a ExplainerRegistry) -> Self {
        Self { registry }
    }

    /// Resolve and construct every requested explainer.
    ///
    /// All names are resolved and validated before anything is
    /// constructed, so a failure never leaves a partial session behind.
    pub fn execute(
        &self,
        input: BuildExplainersInput,
    ) -> Result<BoundExplainers, BuildExplainersError> {
        if input.explainers.is_empty() {
            return Err(BuildExplainersError::NoExplainers);
        }

        let training_data = input
            .training_data
            .unwrap_or_else(|| DataBatch::empty(input.domain));
        if !training_data.is_empty() && training_data.domain() != input.domain {
            return Err(BuildExplainersError::TrainingDataDomain {
                expected: input.domain,
                found: training_data.domain(),
            });
        }

        // Phase 1: resolve and validate everything
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(input.explainers.len());
        for name in &input.explainers {
            if !seen.insert(name.as_str()) {
                return Err(BuildExplainersError::DuplicateRequest(name.clone()));
            }

            let descriptor = self.registry.resolve(input.domain, input.mode, name)?;
            if descriptor.needs_training_data() && training_data.is_empty() {
                return Err(BuildExplainersError::MissingTrainingData {
                    algorithm: name.clone(),
                });
            }
            resolved.push((name.clone(), descriptor.clone()));
        }

        // Phase 2: one adapter and one training set for the whole session
        let predict = Arc::new(PredictFn::new(
            input.model,
            input.preprocess.unwrap_or_else(identity_preprocess),
            input.postprocess.unwrap_or_else(identity_postprocess),
        ));
        let training_data = Arc::new(training_data);

        info!(
            domain = %input.domain,
            mode = %input.mode,
            count = resolved.len(),
            training_instances = training_data.len(),
            "Building explainers"
        );

        let mut entries = Vec::with_capacity(resolved.len());
        for (requested_name, descriptor) in resolved {
            let params = input
                .params
                .get(&requested_name)
                .or_else(|| input.params.get(descriptor.name()))
                .cloned()
                .unwrap_or_default();

            let context = ExplainerContext {
                name: descriptor.name().to_string(),
                domain: input.domain,
                mode: input.mode,
                predict: Arc::clone(&predict),
                training_data: Arc::clone(&training_data),
                params,
            };

            let explainer =
                descriptor
                    .build(context)
                    .map_err(|source| BuildExplainersError::Construction {
                        algorithm: requested_name.clone(),
                        source,
                    })?;

            debug!(
                algorithm = %requested_name,
                canonical = descriptor.name(),
                "Constructed explainer"
            );

            entries.push(BoundExplainer {
                requested_name,
                descriptor,
                explainer: Arc::from(explainer),
            });
        }

        Ok(BoundExplainers {
            domain: input.domain,
            mode: input.mode,
            predict,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        CONSTRUCTED, constant_model, stub_registry, tabular_batch,
    };
    use std::sync::atomic::Ordering;

    fn input(names: &[&str]) -> BuildExplainersInput {
        BuildExplainersInput::new(
            names.iter().copied(),
            DataDomain::Tabular,
            TaskMode::Classification,
            constant_model(),
        )
    }

    #[test]
    fn test_builds_in_request_order() {
        let registry = stub_registry();
        let bound = BuildExplainersUseCase::new(&registry)
            .execute(input(&["stubB", "stubA"]).with_training_data(tabular_batch(4)))
            .unwrap();

        assert_eq!(bound.names().collect::<Vec<_>>(), vec!["stubB", "stubA"]);
        assert_eq!(bound.entries[0].explainer.name(), "stubB");
    }

    #[test]
    fn test_adapter_and_data_are_shared() {
        let registry = stub_registry();
        let bound = BuildExplainersUseCase::new(&registry)
            .execute(input(&["stubA", "stubB"]).with_training_data(tabular_batch(2)))
            .unwrap();

        // The session holds the adapter once and each stub keeps a handle to the same one
        assert_eq!(Arc::strong_count(&bound.predict), 1 + bound.len());
    }

    #[test]
    fn test_missing_training_data_is_atomic() {
        let registry = stub_registry();
        let before = CONSTRUCTED.load(Ordering::SeqCst);

        let err = BuildExplainersUseCase::new(&registry)
            .execute(input(&["counted", "stubB"]))
            .unwrap_err();

        match err {
            BuildExplainersError::MissingTrainingData { algorithm } => {
                assert_eq!(algorithm, "stubB")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_unknown_and_duplicate_names() {
        let registry = stub_registry();
        let use_case = BuildExplainersUseCase::new(&registry);

        assert!(matches!(
            use_case.execute(input(&["stubA", "nope"])),
            Err(BuildExplainersError::Registry(RegistryError::UnknownAlgorithm { .. }))
        ));
        assert!(matches!(
            use_case.execute(input(&["stubA", "stubA"])),
            Err(BuildExplainersError::DuplicateRequest(name)) if name == "stubA"
        ));
        assert!(matches!(
            use_case.execute(input(&[])),
            Err(BuildExplainersError::NoExplainers)
        ));
    }

    #[test]
    fn test_incompatible_mode() {
        let registry = stub_registry();
        let result = BuildExplainersUseCase::new(&registry).execute(BuildExplainersInput::new(
            ["classifier_only"],
            DataDomain::Tabular,
            TaskMode::Regression,
            constant_model(),
        ));
        assert!(matches!(
            result,
            Err(BuildExplainersError::Registry(RegistryError::IncompatibleMode { .. }))
        ));
    }

    #[test]
    fn test_training_data_domain_checked() {
        let registry = stub_registry();
        let result = BuildExplainersUseCase::new(&registry).execute(
            input(&["stubA"]).with_training_data(DataBatch::from(xplain_domain::Text::new(["hi"]))),
        );
        assert!(matches!(
            result,
            Err(BuildExplainersError::TrainingDataDomain { .. })
        ));
    }

    #[test]
    fn test_params_reach_the_factory() {
        let registry = stub_registry();
        let bound = BuildExplainersUseCase::new(&registry)
            .execute(input(&["stubA"]).with_params("stubA", AlgorithmParams::new().with("score", 2.5)))
            .unwrap();
        let query = tabular_batch(1);
        let explanation = bound.entries[0]
            .explainer
            .explain_instances(&query, &AlgorithmParams::new())
            .unwrap();
        assert_eq!(explanation.get(0).unwrap().get_f64("score"), Some(2.5));
    }

    #[test]
    fn test_invalid_params_fail_construction() {
        let registry = stub_registry();
        let result = BuildExplainersUseCase::new(&registry)
            .execute(input(&["stubA"]).with_params("stubA", AlgorithmParams::new().with("scroe", 1)));
        assert!(matches!(
            result,
            Err(BuildExplainersError::Construction { algorithm, .. }) if algorithm == "stubA"
        ));
    }
}
