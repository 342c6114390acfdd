//! Collaborator seams: schema provider, record sink and connector.
//!
//! The engine never talks to a database directly. A [`Connector`] opens a
//! [`Session`] per database; the session answers schema questions and acts as
//! the sink for clearing, pre-loading, inserting and inspecting rows. Every
//! call is awaited to completion before the next one starts.

use crate::error::FillError;
use crate::schema::RawTableMetadata;
use crate::types::ColumnSpec;
use crate::values::{DummyRecord, FieldValue};
use async_trait::async_trait;

/// Source of table and column metadata for the connected database.
#[async_trait]
pub trait SchemaProvider: Send {
    /// Names of all base tables.
    async fn table_names(&mut self) -> Result<Vec<String>, FillError>;

    /// Raw metadata for one table; no columns when the table does not exist.
    async fn describe_table(&mut self, table: &str) -> Result<RawTableMetadata, FillError>;
}

/// Datastore receiving generated records.
#[async_trait]
pub trait RecordSink: Send {
    /// Remove every row of the table.
    async fn clear_table(&mut self, table: &str) -> Result<(), FillError>;

    /// Distinct non-null values currently stored in a column.
    async fn distinct_values(
        &mut self,
        table: &str,
        column: &ColumnSpec,
    ) -> Result<Vec<FieldValue>, FillError>;

    /// Largest integer currently stored in a column, if any.
    async fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, FillError>;

    /// Insert one record; an error rejects only this record.
    async fn insert_record(&mut self, table: &str, record: &DummyRecord)
        -> Result<(), FillError>;

    /// Read a page of stored rows for inspection.
    async fn read_records(
        &mut self,
        table: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<DummyRecord>, FillError>;
}

/// A live connection to one database, reused for every step in it.
#[async_trait]
pub trait Session: SchemaProvider + RecordSink {
    /// Release the connection.
    async fn close(&mut self) -> Result<(), FillError>;
}

/// Opens sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to a database, or to the server only when `database` is `None`.
    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn Session>, FillError>;
}
