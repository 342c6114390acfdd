//! Core types for the dummy-fill record generation engine.
//!
//! This crate provides the foundational types shared by the generator,
//! the database adapters and the orchestrator:
//!
//! - [`TypeCategory`] / [`ColumnSpec`] - Canonical column description
//! - [`TableSchema`] - Ordered, name-unique column list for one table
//! - [`RawColumn`] / [`RawTableMetadata`] - Metadata as reported by a schema provider
//! - [`FieldValue`] / [`DummyRecord`] - Generated values and rows
//! - [`SchemaProvider`] / [`RecordSink`] / [`Connector`] - Collaborator seams
//!
//! # Architecture
//!
//! ```text
//! fill-core (this crate)
//!    │
//!    ├─── fill-generator  (builds batches of DummyRecord from a TableSchema)
//!    ├─── fill-mysql      (implements SchemaProvider / RecordSink for MySQL)
//!    └─── dummy-fill      (orchestrates jobs across tables and databases)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fill_core::{RawColumn, RawTableMetadata, TableSchema, TypeCategory};
//!
//! let raw = RawTableMetadata::new("orders")
//!     .with_column(RawColumn::new("id", "INT"))
//!     .with_column(RawColumn::new("code", "VARCHAR").with_length(5))
//!     .with_primary_key(["id"])
//!     .with_unique_columns(["code"])
//!     .with_generated_columns(["id"]);
//!
//! let schema = TableSchema::from_raw(raw).unwrap();
//! let code = schema.get_column("code").unwrap();
//! assert_eq!(code.category, TypeCategory::ShortText { max_length: 5 });
//! assert!(code.is_unique);
//! ```

pub mod error;
pub mod job;
pub mod provider;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use error::{FillError, SchemaError};
pub use job::{GenerationJob, Operation};
pub use provider::{Connector, RecordSink, SchemaProvider, Session};
pub use schema::{RawColumn, RawTableMetadata, TableSchema};
pub use types::{ColumnSpec, TypeCategory};
pub use values::{DummyRecord, FieldValue};
