//! Application-level configuration.
//!
//! - [`DispatchParams`]: worker limit, failure policy, deadline, predictions

pub mod dispatch_params;

pub use dispatch_params::{DispatchParams, FailurePolicy, default_workers};
