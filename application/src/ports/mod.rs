//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that outer layers implement.

pub mod progress;
