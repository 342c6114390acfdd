//! Error types shared across the fill workspace.
//!
//! `GenerationExhausted` and primary-key collisions are not errors here:
//! they truncate a batch and are reported through the batch outcome instead.

/// Error type for schema normalization.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Table is not present in the live schema
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Two columns with the same name in one table
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A constraint references a column the table does not have
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },
}

/// Errors surfaced by collaborators and the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    /// Job or connection configuration missing, malformed or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database could not be reached
    #[error("Connection error for '{target}': {message}")]
    Connection { target: String, message: String },

    /// Table metadata could not be normalized
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A single record was rejected by the sink
    #[error("Insertion into '{table}' rejected: {message}")]
    Insertion { table: String, message: String },

    /// Any other sink or provider query failure
    #[error("Sink error on '{table}': {message}")]
    Sink { table: String, message: String },
}

impl FillError {
    /// Build a connection error for the given target.
    pub fn connection(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Build an insertion error for the given table.
    pub fn insertion(table: impl Into<String>, message: impl ToString) -> Self {
        Self::Insertion {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Build a generic sink error for the given table.
    pub fn sink(table: impl Into<String>, message: impl ToString) -> Self {
        Self::Sink {
            table: table.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_converts_into_fill_error() {
        let err: FillError = SchemaError::TableNotFound("orders".to_string()).into();
        assert!(matches!(err, FillError::Schema(SchemaError::TableNotFound(_))));
        assert_eq!(err.to_string(), "Schema error: Table not found: orders");
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = FillError::insertion("orders", "Duplicate entry 'abc' for key 'code'");
        assert_eq!(
            err.to_string(),
            "Insertion into 'orders' rejected: Duplicate entry 'abc' for key 'code'"
        );

        let err = FillError::connection("shop", "Connection refused");
        assert_eq!(
            err.to_string(),
            "Connection error for 'shop': Connection refused"
        );
    }
}
