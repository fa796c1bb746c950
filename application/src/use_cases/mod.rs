//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod auto_explainer;
pub mod build_explainers;
pub mod run_explainers;

#[cfg(test)]
pub(crate) mod test_support;
