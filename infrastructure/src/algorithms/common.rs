//! Helpers shared by the built-in algorithms

use serde::de::DeserializeOwned;
use std::borrow::Cow;
use xplain_domain::{
    AlgorithmParams, DataBatch, ExplainerContext, ExplainerError, FieldValue, Fields, Images,
    Predictions, Tabular, TaskMode, Text, Timeseries,
};

/// Typed parameters of a built-in algorithm
pub(crate) trait Settings: DeserializeOwned + Clone {
    /// Range checks the type system cannot express.
    fn validate(&self) -> Result<(), ExplainerError> {
        Ok(())
    }
}

/// Decode and validate a parameter bag.
pub(crate) fn decode_settings<P: Settings>(bag: &AlgorithmParams) -> Result<P, ExplainerError> {
    let settings: P = bag.decode()?;
    settings.validate()?;
    Ok(settings)
}

/// Settings for one call.
///
/// Without explain-time parameters these are the ones decoded at
/// construction; otherwise the construction bag is re-decoded with the
/// call's keys layered on top.
pub(crate) fn call_settings<'a, P: Settings>(
    context: &ExplainerContext,
    built: &'a P,
    overrides: &AlgorithmParams,
) -> Result<Cow<'a, P>, ExplainerError> {
    if overrides.is_empty() {
        return Ok(Cow::Borrowed(built));
    }
    decode_settings(&context.params.merged(overrides)).map(Cow::Owned)
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0
}

/// The output column an explanation is about.
///
/// An explicit `target` wins; otherwise classification explains the
/// predicted class and regression explains output 0.
pub(crate) fn resolve_target(
    mode: TaskMode,
    requested: Option<usize>,
    prediction: &[f64],
) -> Result<usize, ExplainerError> {
    let target = match requested {
        Some(target) => target,
        None if mode.is_classification() => argmax(prediction),
        None => 0,
    };
    if target >= prediction.len() {
        return Err(ExplainerError::InvalidParameters(format!(
            "target {} is out of range for a model with {} outputs",
            target,
            prediction.len()
        )));
    }
    Ok(target)
}

/// Column `target` of every prediction row.
pub(crate) fn target_column(
    predictions: &Predictions,
    target: usize,
) -> Result<Vec<f64>, ExplainerError> {
    predictions
        .iter()
        .enumerate()
        .map(|(row, values)| {
            values.get(target).copied().ok_or_else(|| {
                ExplainerError::Failed(format!(
                    "prediction row {} has {} outputs, needed column {}",
                    row,
                    values.len(),
                    target
                ))
            })
        })
        .collect()
}

/// Column-wise mean of the predictions, used to pick a global target.
pub(crate) fn mean_prediction(predictions: &Predictions) -> Vec<f64> {
    let width = predictions.first().map(Vec::len).unwrap_or(0);
    let mut means = vec![0.0; width];
    for row in predictions {
        for (mean, value) in means.iter_mut().zip(row) {
            *mean += value;
        }
    }
    let n = predictions.len().max(1) as f64;
    means.iter_mut().for_each(|m| *m /= n);
    means
}

pub(crate) fn fields<const N: usize>(entries: [(&str, FieldValue); N]) -> Fields {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub(crate) fn text_list(values: &[String]) -> FieldValue {
    FieldValue::List(values.iter().map(|v| FieldValue::from(v.as_str())).collect())
}

/// Predict a set of perturbed tabular rows shaped like `template`.
pub(crate) fn predict_rows(
    context: &ExplainerContext,
    template: &Tabular,
    rows: Vec<Vec<f64>>,
) -> Result<Predictions, ExplainerError> {
    let batch = DataBatch::from(template.with_rows(rows)?);
    Ok(context.predict.predict(&batch)?)
}

fn wrong_domain(role: &str, expected: &str, batch: &DataBatch) -> ExplainerError {
    ExplainerError::UnsupportedInput(format!(
        "{} must be {} data, got {}",
        role,
        expected,
        batch.domain()
    ))
}

pub(crate) fn tabular<'a>(batch: &'a DataBatch, role: &str) -> Result<&'a Tabular, ExplainerError> {
    batch
        .as_tabular()
        .ok_or_else(|| wrong_domain(role, "tabular", batch))
}

pub(crate) fn text<'a>(batch: &'a DataBatch, role: &str) -> Result<&'a Text, ExplainerError> {
    batch.as_text().ok_or_else(|| wrong_domain(role, "text", batch))
}

pub(crate) fn images<'a>(batch: &'a DataBatch, role: &str) -> Result<&'a Images, ExplainerError> {
    batch.as_images().ok_or_else(|| wrong_domain(role, "image", batch))
}

pub(crate) fn timeseries<'a>(
    batch: &'a DataBatch,
    role: &str,
) -> Result<&'a Timeseries, ExplainerError> {
    batch
        .as_timeseries()
        .ok_or_else(|| wrong_domain(role, "timeseries", batch))
}

/// Fails when the query's feature layout differs from the training data's.
pub(crate) fn check_width(query: usize, training: usize) -> Result<(), ExplainerError> {
    if query != training {
        return Err(ExplainerError::UnsupportedInput(format!(
            "query has {} features, training data has {}",
            query, training
        )));
    }
    Ok(())
}
