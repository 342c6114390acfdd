//! Test doubles for the collaborator seams.
//!
//! These stand in for MySQL and the YAML files so the orchestrator can be
//! exercised end to end in unit and integration tests.

pub mod config;
pub mod memory;

pub use config::StaticConfigProvider;
pub use memory::{MemoryDatabase, MemoryServer, MemorySession, MemoryTable};
