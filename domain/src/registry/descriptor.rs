//! Algorithm descriptors

use crate::core::task::{DataDomain, TaskMode};
use crate::explainer::{Explainer, ExplainerContext, ExplainerError};
use std::sync::Arc;

/// Builds a bound algorithm from its session context
pub type ExplainerFactory =
    Arc<dyn Fn(ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> + Send + Sync>;

/// Static description of one registered algorithm
///
/// Defaults: every task mode, no training data, local explanations only.
#[derive(Clone)]
pub struct AlgorithmDescriptor {
    domain: DataDomain,
    name: String,
    aliases: Vec<String>,
    modes: Vec<TaskMode>,
    requires_training_data: bool,
    supports_local: bool,
    supports_global: bool,
    description: String,
    factory: ExplainerFactory,
}

impl AlgorithmDescriptor {
    pub fn new<F>(domain: DataDomain, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            domain,
            name: name.into(),
            aliases: Vec::new(),
            modes: TaskMode::ALL.to_vec(),
            requires_training_data: false,
            supports_local: true,
            supports_global: false,
            description: String::new(),
            factory: Arc::new(factory),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Restrict the algorithm to the given task modes.
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = TaskMode>) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }

    pub fn requires_training_data(mut self) -> Self {
        self.requires_training_data = true;
        self
    }

    pub fn with_scopes(mut self, local: bool, global: bool) -> Self {
        self.supports_local = local;
        self.supports_global = global;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    // ==================== Accessors ====================

    pub fn domain(&self) -> DataDomain {
        self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn modes(&self) -> &[TaskMode] {
        &self.modes
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn needs_training_data(&self) -> bool {
        self.requires_training_data
    }

    pub fn supports_local(&self) -> bool {
        self.supports_local
    }

    pub fn supports_global(&self) -> bool {
        self.supports_global
    }

    pub fn is_global_only(&self) -> bool {
        self.supports_global && !self.supports_local
    }

    pub fn supports_mode(&self, mode: TaskMode) -> bool {
        self.modes.contains(&mode)
    }

    /// All names this descriptor answers to (canonical first).
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Build a bound instance of this algorithm.
    pub fn build(&self, context: ExplainerContext) -> Result<Box<dyn Explainer>, ExplainerError> {
        (self.factory)(context)
    }
}

impl PartialEq for AlgorithmDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.name == other.name
            && self.aliases == other.aliases
            && self.modes == other.modes
            && self.requires_training_data == other.requires_training_data
            && self.supports_local == other.supports_local
            && self.supports_global == other.supports_global
            && self.description == other.description
            && Arc::ptr_eq(&self.factory, &other.factory)
    }
}

impl std::fmt::Debug for AlgorithmDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmDescriptor")
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("modes", &self.modes)
            .field("requires_training_data", &self.requires_training_data)
            .field("supports_local", &self.supports_local)
            .field("supports_global", &self.supports_global)
            .finish_non_exhaustive()
    }
}
