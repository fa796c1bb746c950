//! Core domain concepts shared across all subdomains.
//!
//! - [`task::DataDomain`]: the kind of data an explainer works on
//! - [`task::TaskMode`]: classification or regression
//! - [`error::DomainError`]: parse errors for the above

pub mod error;
pub mod task;
