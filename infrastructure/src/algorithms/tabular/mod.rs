//! Built-in tabular algorithms

mod occlusion;
mod pdp;
mod permutation;
mod sensitivity;

pub use occlusion::OcclusionExplainer;
pub use pdp::PdpExplainer;
pub use permutation::PermutationExplainer;
pub use sensitivity::SensitivityExplainer;
