//! Stub explainers shared by the use case tests

use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use xplain_domain::{
    AlgorithmDescriptor, AlgorithmParams, BoxError, DataBatch, DataDomain, Explainer, ExplainerContext,
    ExplainerError, Explanation, ExplanationBuilder, FieldValue, Fields, ModelInput,
    Predictions, PredictiveModel, Tabular, TaskMode,
};

/// Number of times the "counted" stub was constructed
pub static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy)]
enum Behavior {
    Score,
    TrainingSize,
    Slow,
    Failing,
    Short,
    Panicky,
    Global,
    Unbounded,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct StubParams {
    score: f64,
}

impl Default for StubParams {
    fn default() -> Self {
        Self { score: 1.0 }
    }
}

struct Stub {
    context: ExplainerContext,
    behavior: Behavior,
    params: StubParams,
}

impl Stub {
    /// Build-time params with this call's overrides on top
    fn score(&self, overrides: &AlgorithmParams) -> Result<f64, ExplainerError> {
        if overrides.is_empty() {
            return Ok(self.params.score);
        }
        let params: StubParams = self.context.params.merged(overrides).decode()?;
        Ok(params.score)
    }

    fn fields(&self, key: &str, value: impl Into<FieldValue>) -> Fields {
        Fields::from([(key.to_string(), value.into())])
    }
}

impl Explainer for Stub {
    fn name(&self) -> &str {
        &self.context.name
    }

    fn explain_instances(
        &self,
        query: &DataBatch,
        overrides: &AlgorithmParams,
    ) -> Result<Explanation, ExplainerError> {
        let score = self.score(overrides)?;
        // Every stub goes through the shared adapter like a real algorithm would
        self.context.predict.predict(query)?;

        let mut builder =
            ExplanationBuilder::new(&self.context.name, self.context.domain, self.context.mode);
        let count = match self.behavior {
            Behavior::Short => query.len().saturating_sub(1),
            _ => query.len(),
        };

        for _ in 0..count {
            match self.behavior {
                Behavior::Failing => return Err(ExplainerError::Failed("boom".to_string())),
                Behavior::Panicky => panic!("stub exploded"),
                Behavior::Slow => {
                    std::thread::sleep(Duration::from_millis(100));
                    builder.add(self.fields("score", score));
                }
                Behavior::Unbounded => {
                    builder.add(self.fields("score", f64::INFINITY));
                }
                Behavior::TrainingSize => {
                    builder.add(self.fields(
                        "training_instances",
                        self.context.training_data.len(),
                    ));
                }
                _ => {
                    builder.add(self.fields("score", score));
                }
            }
        }

        Ok(builder.seal())
    }

    fn explain_global(&self, _overrides: &AlgorithmParams) -> Result<Explanation, ExplainerError> {
        match self.behavior {
            Behavior::Global => Ok(Explanation::global(
                &self.context.name,
                self.context.domain,
                self.context.mode,
                self.fields("importance", vec![0.25, 0.75]),
            )),
            _ => Err(ExplainerError::Unsupported(
                xplain_domain::ExplanationScope::Global,
            )),
        }
    }
}

fn stub(name: &str, behavior: Behavior) -> AlgorithmDescriptor {
    let counted = name == "counted";
    AlgorithmDescriptor::new(DataDomain::Tabular, name, move |context: ExplainerContext| {
        if counted {
            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        }
        if matches!(behavior, Behavior::TrainingSize) && context.training_data.is_empty() {
            return Err(ExplainerError::Failed("training data is empty".to_string()));
        }
        let params: StubParams = context.params.decode()?;
        Ok(Box::new(Stub {
            context,
            behavior,
            params,
        }) as Box<dyn Explainer>)
    })
}

/// Registry of stubs covering each dispatch path
pub fn stub_registry() -> xplain_domain::ExplainerRegistry {
    let mut builder = xplain_domain::ExplainerRegistry::builder();
    builder
        .register(stub("stubA", Behavior::Score))
        .unwrap()
        .register(stub("stubB", Behavior::TrainingSize).requires_training_data())
        .unwrap()
        .register(stub("counted", Behavior::Score))
        .unwrap()
        .register(stub("slow", Behavior::Slow))
        .unwrap()
        .register(stub("failing", Behavior::Failing))
        .unwrap()
        .register(stub("short", Behavior::Short))
        .unwrap()
        .register(stub("panicky", Behavior::Panicky))
        .unwrap()
        .register(stub("unbounded", Behavior::Unbounded))
        .unwrap()
        .register(stub("global_stub", Behavior::Global).with_scopes(false, true))
        .unwrap()
        .register(
            stub("classifier_only", Behavior::Score).with_modes([TaskMode::Classification]),
        )
        .unwrap();
    builder.build()
}

/// A two-class model that always answers `[0.3, 0.7]`
pub fn constant_model() -> Arc<dyn PredictiveModel> {
    Arc::new(|input: &ModelInput| -> Result<Predictions, BoxError> {
        Ok(vec![vec![0.3, 0.7]; input.len()])
    })
}

pub fn tabular_batch(n: usize) -> DataBatch {
    let rows = (0..n).map(|i| vec![i as f64, 1.0 - i as f64]).collect();
    DataBatch::from(Tabular::from_rows(rows).unwrap())
}
