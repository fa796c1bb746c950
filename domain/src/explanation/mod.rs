//! Explanation results and their textual envelope
//!
//! - [`FieldValue`] - loosely-typed value of one algorithm-specific field
//! - [`ExplanationRecord`] - one instance's (or the global) explanation payload
//! - [`Explanation`] - sealed, ordered records produced by one algorithm run
//! - [`AggregatedResult`] - explanations of a whole session keyed by requested name
//!
//! # Lifecycle
//!
//! ```text
//! ExplanationBuilder::new()  ──add()*──▶  seal()  ──▶  Explanation (immutable)
//! ```
//!
//! # Envelope
//!
//! ```json
//! {"algorithm_name":"occlusion","domain":"tabular","mode":"classification",
//!  "records":[{"instance_id":0,"fields":{"importances":[0.25,-0.5]}}]}
//! ```
//!
//! Field maps are ordered by key, so the encoding is canonical and
//! `to_text(from_text(s)) == s` holds for every `s` produced by `to_text`.

pub mod aggregated;
pub mod container;
pub mod record;
pub mod value;

pub use aggregated::{AggregatedResult, AlgorithmFailure};
pub use container::{Explanation, ExplanationBuilder, ExplanationScope, PayloadError};
pub use record::{ExplanationRecord, Fields, InstanceId};
pub use value::FieldValue;
