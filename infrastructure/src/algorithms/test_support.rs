//! Context builders for algorithm tests

use crate::model::{LinearModel, Link};
use std::sync::Arc;
use xplain_domain::{
    AlgorithmParams, DataBatch, DataDomain, ExplainerContext, PredictFn, PredictiveModel, Tabular,
    TaskMode,
};

pub fn context(
    domain: DataDomain,
    mode: TaskMode,
    model: Arc<dyn PredictiveModel>,
    training_data: Option<DataBatch>,
    params: AlgorithmParams,
) -> ExplainerContext {
    ExplainerContext {
        name: "test".to_string(),
        domain,
        mode,
        predict: Arc::new(PredictFn::identity(model)),
        training_data: Arc::new(training_data.unwrap_or_else(|| DataBatch::empty(domain))),
        params,
    }
}

pub fn linear(weights: Vec<Vec<f64>>, link: Link) -> Arc<dyn PredictiveModel> {
    Arc::new(LinearModel::new(weights, Vec::new(), link).unwrap())
}

pub fn table(rows: Vec<Vec<f64>>) -> DataBatch {
    DataBatch::from(Tabular::from_rows(rows).unwrap())
}
