//! The registry itself

use super::descriptor::AlgorithmDescriptor;
use crate::core::task::{DataDomain, TaskMode};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Registry lookup and registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown {domain} algorithm: {name}")]
    UnknownAlgorithm { domain: DataDomain, name: String },

    #[error("Algorithm '{name}' does not support {mode} mode for {domain} data")]
    IncompatibleMode {
        domain: DataDomain,
        name: String,
        mode: TaskMode,
    },

    #[error("Duplicate {domain} algorithm name: {name}")]
    DuplicateName { domain: DataDomain, name: String },
}

fn key(domain: DataDomain, name: &str) -> (DataDomain, String) {
    (domain, name.trim().to_ascii_lowercase())
}

/// Mutable registration phase of an [`ExplainerRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<AlgorithmDescriptor>,
    index: HashMap<(DataDomain, String), usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its name and every alias.
    ///
    /// Fails without registering anything if any of those names is already
    /// taken in the descriptor's domain.
    pub fn register(&mut self, descriptor: AlgorithmDescriptor) -> Result<&mut Self, RegistryError> {
        let domain = descriptor.domain();
        let mut keys = Vec::new();
        for name in descriptor.all_names() {
            let k = key(domain, name);
            if self.index.contains_key(&k) || keys.contains(&k) {
                return Err(RegistryError::DuplicateName {
                    domain,
                    name: name.to_string(),
                });
            }
            keys.push(k);
        }

        debug!(
            domain = %domain,
            algorithm = descriptor.name(),
            aliases = ?descriptor.aliases(),
            "Registered algorithm"
        );

        let position = self.descriptors.len();
        for k in keys {
            self.index.insert(k, position);
        }
        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Seal the table. The result has no registration methods.
    pub fn build(self) -> ExplainerRegistry {
        ExplainerRegistry {
            descriptors: self.descriptors,
            index: self.index,
        }
    }
}

/// Read-only table of algorithm descriptors
#[derive(Debug, Default)]
pub struct ExplainerRegistry {
    descriptors: Vec<AlgorithmDescriptor>,
    index: HashMap<(DataDomain, String), usize>,
}

impl ExplainerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up by canonical name or alias, ignoring the task mode.
    pub fn get(&self, domain: DataDomain, name: &str) -> Option<&AlgorithmDescriptor> {
        self.index
            .get(&key(domain, name))
            .map(|&i| &self.descriptors[i])
    }

    /// Look up an algorithm and check it supports `mode`.
    pub fn resolve(
        &self,
        domain: DataDomain,
        mode: TaskMode,
        name: &str,
    ) -> Result<&AlgorithmDescriptor, RegistryError> {
        let descriptor = self
            .get(domain, name)
            .ok_or_else(|| RegistryError::UnknownAlgorithm {
                domain,
                name: name.to_string(),
            })?;

        if !descriptor.supports_mode(mode) {
            return Err(RegistryError::IncompatibleMode {
                domain,
                name: descriptor.name().to_string(),
                mode,
            });
        }
        Ok(descriptor)
    }

    /// Descriptors of `domain` in registration order.
    pub fn list(&self, domain: DataDomain) -> impl Iterator<Item = &AlgorithmDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.domain() == domain)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
