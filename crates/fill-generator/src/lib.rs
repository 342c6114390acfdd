//! Constraint-aware record generator for dummy-fill.
//!
//! This crate turns a normalized [`TableSchema`](fill_core::TableSchema) into
//! batches of [`DummyRecord`](fill_core::DummyRecord)s that respect column
//! types, lengths, uniqueness and primary keys. Every RNG is seeded from the
//! [`GenerationPolicy`], so a run with a fixed seed is reproducible.
//!
//! # Architecture
//!
//! ```text
//! TableSchema + ExistingState
//!        │
//!        ▼
//! ┌────────────────────────────┐
//! │        BatchBuilder        │
//! │                            │
//! │  generated → Identity      │
//! │  unique    → Uniqueness    │──► PrimaryKeyGuard
//! │  other     → FieldGenerator│
//! └─────────────┬──────────────┘
//!               │
//!               ▼
//!    BatchOutcome { records, termination }
//! ```
//!
//! # Example
//!
//! ```rust
//! use fill_core::{ColumnSpec, TableSchema, TypeCategory};
//! use fill_generator::{BatchBuilder, BatchTermination, ExistingState, GenerationPolicy};
//!
//! let schema = TableSchema::new(
//!     "orders",
//!     vec![
//!         ColumnSpec::new("id", TypeCategory::Integer { min: 0, max: i64::MAX })
//!             .primary_key()
//!             .generated(),
//!         ColumnSpec::new("code", TypeCategory::ShortText { max_length: 5 }).unique(),
//!     ],
//! )
//! .unwrap();
//!
//! let policy = GenerationPolicy::default().with_seed(42);
//! let outcome = BatchBuilder::new(&schema, &policy).build(3, &ExistingState::empty());
//!
//! assert_eq!(outcome.records.len(), 3);
//! assert_eq!(outcome.termination, BatchTermination::Completed);
//! ```

pub mod batch;
pub mod field;
pub mod generators;
pub mod guard;
pub mod policy;
pub mod sequence;
pub mod unique;

pub use batch::{BatchBuilder, BatchOutcome, BatchTermination, ExistingState};
pub use field::FieldGenerator;
pub use generators::{generate_value, value_space};
pub use guard::{PrimaryKeyCollision, PrimaryKeyGuard};
pub use policy::{
    derive_seed, CollisionPolicy, GenerationPolicy, IdentityStart, DEFAULT_MAX_UNIQUE_RETRIES,
};
pub use sequence::IdentitySequencer;
pub use unique::{GenerationExhausted, UniquenessResolver};
