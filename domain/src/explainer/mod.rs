//! The explainer capability contract
//!
//! An explanation algorithm is anything implementing [`Explainer`]. It is
//! built by a registry factory from an [`ExplainerContext`] that carries
//! the shared predict adapter, the shared training data and the
//! algorithm's own [`AlgorithmParams`].

pub mod params;
pub mod traits;

pub use params::AlgorithmParams;
pub use traits::{Explainer, ExplainerContext, ExplainerError};
