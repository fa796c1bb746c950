//! Built-in explanation algorithms
//!
//! | Domain | Algorithm | Training data | Scope |
//! |--------|-----------|---------------|-------|
//! | tabular | `sensitivity` (`gradient`) | no | local |
//! | tabular | `occlusion` (`ablation`) | yes | local |
//! | tabular | `permutation` (`pfi`) | yes | global |
//! | tabular | `pdp` | yes | global |
//! | text | `word_occlusion` | no | local |
//! | image | `patch_occlusion` | no | local, classification only |
//! | timeseries | `timestep_occlusion` | yes | local |
//!
//! Every algorithm decodes its own parameters and rejects unknown keys.

pub(crate) mod common;
pub mod image;
mod registry;
pub mod tabular;
pub mod text;
pub mod timeseries;

#[cfg(test)]
pub(crate) mod test_support;

pub use image::PatchOcclusionExplainer;
pub use registry::{builtin_registry, register_builtins};
pub use tabular::{OcclusionExplainer, PdpExplainer, PermutationExplainer, SensitivityExplainer};
pub use text::WordOcclusionExplainer;
pub use timeseries::TimestepOcclusionExplainer;
