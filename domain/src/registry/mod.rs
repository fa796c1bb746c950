//! Algorithm descriptor table
//!
//! Maps `(domain, name)` to an [`AlgorithmDescriptor`]: a factory plus the
//! capability flags the orchestrator needs before it builds anything.
//!
//! ```text
//! RegistryBuilder ──register()*──▶ build() ──▶ ExplainerRegistry (read-only)
//! ```
//!
//! Registration only exists on [`RegistryBuilder`]; once built, the table
//! has no mutating methods, so it can be shared across threads freely.
//! Names and aliases are matched case-insensitively and must be unique
//! within a domain.

pub mod descriptor;
pub mod table;

pub use descriptor::{AlgorithmDescriptor, ExplainerFactory};
pub use table::{ExplainerRegistry, RegistryBuilder, RegistryError};
