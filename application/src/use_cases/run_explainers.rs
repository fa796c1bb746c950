//! Run Explainers use case
//!
//! Dispatches every bound explainer of a session against one query batch on
//! a bounded pool of blocking workers and merges the results, in request
//! order, into an [`AggregatedResult`].

use crate::config::{DispatchParams, FailurePolicy};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::build_explainers::{BoundExplainer, BoundExplainers};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use xplain_domain::{
    AdapterError, AdapterStage, AggregatedResult, AlgorithmParams, DataBatch, DataDomain,
    Explainer, ExplainerError, Explanation, ExplanationBuilder, ExplanationScope, TaskMode,
};

/// Errors that can occur while dispatching explainers
#[derive(Error, Debug)]
pub enum RunExplainersError {
    #[error("Explainer '{algorithm}' only produces per-instance explanations and needs a query")]
    MissingQuery { algorithm: String },

    #[error("Query is {found} data, but the session explains {expected} data")]
    QueryDomain {
        expected: DataDomain,
        found: DataDomain,
    },

    #[error("Explainer '{algorithm}' failed: {source}")]
    PartialExplanation {
        algorithm: String,
        #[source]
        source: ExplainerError,
    },

    #[error("Parameters given for '{name}', which is not part of this session")]
    UnknownParams { name: String },

    #[error("Dispatch cancelled before {} explainer(s) started: {}", pending.len(), pending.join(", "))]
    Cancelled { pending: Vec<String> },

    #[error("Prediction failed: {0}")]
    Predict(#[source] AdapterError),
}

/// What one worker hands back
struct Outcome {
    index: usize,
    result: Result<Explanation, ExplainerError>,
    elapsed: Duration,
}

/// Use case for running bound explainers against a query
#[derive(Debug)]
pub struct RunExplainersUseCase {
    params: DispatchParams,
}

impl RunExplainersUseCase {
    pub fn new(params: DispatchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress and no cancellation
    pub async fn execute(
        &self,
        bound: &BoundExplainers,
        query: Option<DataBatch>,
    ) -> Result<AggregatedResult, RunExplainersError> {
        self.execute_with_progress(
            bound,
            query,
            &HashMap::new(),
            &NoProgress,
            CancellationToken::new(),
        )
        .await
    }

    /// Execute the use case with explain-time parameters, progress callbacks
    /// and a cancellation signal.
    ///
    /// `params` is keyed like the build-time parameters (requested name, or
    /// canonical name) and layered over them for this call only.
    ///
    /// Cancellation (and the configured timeout) is only observed between
    /// invocations; an explainer that already started runs to completion.
    pub async fn execute_with_progress(
        &self,
        bound: &BoundExplainers,
        query: Option<DataBatch>,
        params: &HashMap<String, AlgorithmParams>,
        progress: &dyn ProgressNotifier,
        cancellation: CancellationToken,
    ) -> Result<AggregatedResult, RunExplainersError> {
        let query = query.map(Arc::new);

        if let Some(q) = &query
            && q.domain() != bound.domain
        {
            return Err(RunExplainersError::QueryDomain {
                expected: bound.domain,
                found: q.domain(),
            });
        }

        let overrides = Self::overrides(bound, params)?;
        let scopes = Self::plan(bound, query.is_some())?;
        let deadline = self.params.timeout.map(|t| Instant::now() + t);

        info!(
            domain = %bound.domain,
            mode = %bound.mode,
            explainers = bound.len(),
            instances = query.as_ref().map_or(0, |q| q.len()),
            max_workers = self.params.max_workers,
            policy = %self.params.failure_policy,
            "Dispatching explainers"
        );

        let predictions = match (&query, self.params.run_predict) {
            (Some(q), true) if q.is_empty() => Some(Vec::new()),
            (Some(q), true) => Some(Self::predict(bound, Arc::clone(q)).await?),
            _ => None,
        };

        let total = bound.len();
        progress.on_dispatch_start(total);

        let mut join_set = JoinSet::new();
        let mut slots: Vec<Option<Result<Explanation, ExplainerError>>> =
            (0..total).map(|_| None).collect();
        let workers = self.params.max_workers.max(1);
        let mut next = 0;

        loop {
            while next < total && join_set.len() < workers {
                if Self::is_cancelled(&cancellation, deadline) {
                    join_set.abort_all();
                    progress.on_dispatch_complete();
                    return Err(Self::cancelled(bound, next));
                }

                let entry = &bound.entries[next];
                let explainer = Arc::clone(&entry.explainer);
                let scope = scopes[next];
                let query = query.clone();
                let overrides = overrides[next].clone();
                let (domain, mode) = (bound.domain, bound.mode);
                let index = next;

                debug!(algorithm = %entry.requested_name, %scope, "Starting explainer");
                progress.on_explainer_start(&entry.requested_name);

                join_set.spawn_blocking(move || {
                    let started = std::time::Instant::now();
                    let result = Self::invoke(
                        explainer.as_ref(),
                        scope,
                        query.as_deref(),
                        &overrides,
                        (domain, mode),
                    );
                    Outcome {
                        index,
                        result,
                        elapsed: started.elapsed(),
                    }
                });
                next += 1;
            }

            let joined = if next < total {
                tokio::select! {
                    joined = join_set.join_next() => joined,
                    _ = Self::wait_cancelled(&cancellation, deadline) => {
                        join_set.abort_all();
                        progress.on_dispatch_complete();
                        return Err(Self::cancelled(bound, next));
                    }
                }
            } else {
                join_set.join_next().await
            };

            let Some(joined) = joined else {
                break;
            };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Task join error: {}", e);
                    continue;
                }
            };

            let entry = &bound.entries[outcome.index];
            let expected = match scopes[outcome.index] {
                ExplanationScope::Local => query.as_ref().map(|q| q.len()),
                ExplanationScope::Global => None,
            };
            let result = outcome.result.and_then(|explanation| {
                explanation
                    .check_shape(expected)
                    .map(|()| explanation)
                    .map_err(|e| ExplainerError::Failed(format!("malformed result: {}", e)))
            });

            let result = match result {
                Ok(explanation) => {
                    info!(
                        algorithm = %entry.requested_name,
                        records = explanation.len(),
                        elapsed_ms = outcome.elapsed.as_millis() as u64,
                        "Explainer finished"
                    );
                    progress.on_explainer_complete(&entry.requested_name, true);
                    Ok(explanation)
                }
                Err(e) => {
                    warn!(algorithm = %entry.requested_name, "Explainer failed: {}", e);
                    progress.on_explainer_complete(&entry.requested_name, false);

                    if self.params.failure_policy == FailurePolicy::FailFast {
                        join_set.abort_all();
                        progress.on_dispatch_complete();
                        return Err(RunExplainersError::PartialExplanation {
                            algorithm: entry.requested_name.clone(),
                            source: e,
                        });
                    }
                    Err(e)
                }
            };

            slots[outcome.index] = Some(result);
        }

        progress.on_dispatch_complete();
        self.assemble(bound, slots, predictions)
    }

    /// Explain-time parameters per entry, rejecting keys that name no entry.
    fn overrides(
        bound: &BoundExplainers,
        params: &HashMap<String, AlgorithmParams>,
    ) -> Result<Vec<AlgorithmParams>, RunExplainersError> {
        let known = |entry: &BoundExplainer, key: &str| {
            entry.requested_name == key || entry.descriptor.name() == key
        };
        if let Some(name) = params
            .keys()
            .find(|key| !bound.entries.iter().any(|entry| known(entry, key.as_str())))
        {
            return Err(RunExplainersError::UnknownParams { name: name.clone() });
        }

        Ok(bound
            .entries
            .iter()
            .map(|entry| {
                params
                    .get(&entry.requested_name)
                    .or_else(|| params.get(entry.descriptor.name()))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Decide per explainer whether it runs locally or globally.
    fn plan(
        bound: &BoundExplainers,
        has_query: bool,
    ) -> Result<Vec<ExplanationScope>, RunExplainersError> {
        bound
            .entries
            .iter()
            .map(|entry| {
                let descriptor = &entry.descriptor;
                if descriptor.is_global_only() {
                    Ok(ExplanationScope::Global)
                } else if has_query {
                    Ok(ExplanationScope::Local)
                } else if descriptor.supports_global() {
                    Ok(ExplanationScope::Global)
                } else {
                    Err(RunExplainersError::MissingQuery {
                        algorithm: entry.requested_name.clone(),
                    })
                }
            })
            .collect()
    }

    fn invoke(
        explainer: &dyn Explainer,
        scope: ExplanationScope,
        query: Option<&DataBatch>,
        overrides: &AlgorithmParams,
        (domain, mode): (DataDomain, TaskMode),
    ) -> Result<Explanation, ExplainerError> {
        let run = || match (scope, query) {
            // Nothing to attribute, and the model is never asked about zero rows
            (ExplanationScope::Local, Some(query)) if query.is_empty() => {
                Ok(ExplanationBuilder::new(explainer.name(), domain, mode).seal())
            }
            (ExplanationScope::Local, Some(query)) => {
                explainer.explain_instances(query, overrides)
            }
            (ExplanationScope::Local, None) => Err(ExplainerError::UnsupportedInput(
                "no query to explain".to_string(),
            )),
            (ExplanationScope::Global, _) => explainer.explain_global(overrides),
        };

        catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExplainerError::Failed(format!("panicked: {}", message)))
        })
    }

    async fn predict(
        bound: &BoundExplainers,
        query: Arc<DataBatch>,
    ) -> Result<xplain_domain::Predictions, RunExplainersError> {
        let predict = Arc::clone(&bound.predict);
        tokio::task::spawn_blocking(move || predict.predict(&query))
            .await
            .map_err(|e| AdapterError::new(AdapterStage::Model, e))
            .and_then(|r| r)
            .map_err(RunExplainersError::Predict)
    }

    fn assemble(
        &self,
        bound: &BoundExplainers,
        slots: Vec<Option<Result<Explanation, ExplainerError>>>,
        predictions: Option<xplain_domain::Predictions>,
    ) -> Result<AggregatedResult, RunExplainersError> {
        let mut result = AggregatedResult::new();

        for (entry, slot) in bound.entries.iter().zip(slots) {
            let name = entry.requested_name.as_str();
            match slot {
                Some(Ok(explanation)) => result.insert(name, explanation),
                Some(Err(e)) => result.add_failure(name, e.to_string()),
                None => {
                    let source = ExplainerError::Failed("worker did not complete".to_string());
                    if self.params.failure_policy == FailurePolicy::FailFast {
                        return Err(RunExplainersError::PartialExplanation {
                            algorithm: name.to_string(),
                            source,
                        });
                    }
                    result.add_failure(name, source.to_string());
                }
            }
        }

        if let Some(predictions) = predictions {
            result = result.with_predictions(predictions);
        }

        info!(
            explanations = result.len(),
            failures = result.failures().len(),
            "Dispatch complete"
        );
        Ok(result)
    }

    fn is_cancelled(token: &CancellationToken, deadline: Option<Instant>) -> bool {
        token.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
    }

    async fn wait_cancelled(token: &CancellationToken, deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => token.cancelled().await,
        }
    }

    fn cancelled(bound: &BoundExplainers, started: usize) -> RunExplainersError {
        let pending: Vec<String> = bound.entries[started..]
            .iter()
            .map(|e| e.requested_name.clone())
            .collect();
        warn!(pending = pending.len(), "Dispatch cancelled");
        RunExplainersError::Cancelled { pending }
    }
}
