//! The process-wide registry of built-in algorithms

use super::image::PatchOcclusionExplainer;
use super::tabular::{OcclusionExplainer, PdpExplainer, PermutationExplainer, SensitivityExplainer};
use super::text::WordOcclusionExplainer;
use super::timeseries::TimestepOcclusionExplainer;
use std::sync::OnceLock;
use tracing::{error, info};
use xplain_domain::{ExplainerRegistry, RegistryBuilder, RegistryError};

static BUILTIN: OnceLock<Result<ExplainerRegistry, RegistryError>> = OnceLock::new();

/// Register every built-in algorithm into `builder`.
///
/// Useful for extending the built-ins with custom algorithms before
/// sealing the registry.
pub fn register_builtins(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register(SensitivityExplainer::descriptor())?
        .register(OcclusionExplainer::descriptor())?
        .register(PermutationExplainer::descriptor())?
        .register(PdpExplainer::descriptor())?
        .register(WordOcclusionExplainer::descriptor())?
        .register(PatchOcclusionExplainer::descriptor())?
        .register(TimestepOcclusionExplainer::descriptor())?;
    Ok(())
}

/// The built-in registry, sealed on first use.
///
/// A registration conflict is remembered and returned on every call; no
/// partial registry is ever handed out.
pub fn builtin_registry() -> Result<&'static ExplainerRegistry, RegistryError> {
    BUILTIN
        .get_or_init(|| seal(register_builtins))
        .as_ref()
        .map_err(Clone::clone)
}

fn seal(
    register: impl FnOnce(&mut RegistryBuilder) -> Result<(), RegistryError>,
) -> Result<ExplainerRegistry, RegistryError> {
    let mut builder = ExplainerRegistry::builder();
    if let Err(e) = register(&mut builder) {
        error!("Failed to register built-in explainers: {}", e);
        return Err(e);
    }
    let registry = builder.build();
    info!(algorithms = registry.len(), "Built-in explainer registry ready");
    Ok(registry)
}
