//! dummy-fill library
//!
//! Fills relational tables with synthetic records that respect column types,
//! lengths, nullability, uniqueness, primary keys and auto-generated
//! identifiers.
//!
//! # Features
//!
//! - Clear-and-fill, append and read-only inspect jobs per table
//! - Per-database YAML job files selecting tables and record counts
//! - Reproducible generation from a single seed
//! - Failures isolated per table and per database
//!
//! # Crates
//!
//! - `fill_core` - column model, values, error taxonomy and collaborator traits
//! - `fill_generator` - the constraint-aware batch builder
//! - `fill_mysql` - MySQL schema provider and record sink
//!
//! # CLI Usage
//!
//! ```bash
//! # Write a job file for the shop database
//! dummy-fill init-job --server local --database shop --command truncate \
//!   --tables "orders:5000,customers:2000"
//!
//! # Run every job of the server's databases
//! DB_PASSWORD=secret dummy-fill run --server local --seed 42
//! ```

pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod testing;

pub use config::{ConfigError, ConfigProvider, FileConfigProvider};
pub use orchestrator::{DatabaseRunner, RunReport, RunSettings};
