//! Per-table generation jobs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Clear the table, then generate and insert
    ClearAndFill,
    /// Generate and insert on top of the existing rows
    Append,
    /// Read and report the current contents only
    InspectOnly,
}

impl Operation {
    /// Whether this operation writes to the table.
    pub fn mutates(self) -> bool {
        !matches!(self, Self::InspectOnly)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearAndFill => write!(f, "clear_and_fill"),
            Self::Append => write!(f, "append"),
            Self::InspectOnly => write!(f, "inspect_only"),
        }
    }
}

/// Generation request for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    /// Target table
    pub table_name: String,
    /// Number of records to generate (already raised to the configured floor)
    pub requested_count: u64,
    /// Operation to perform
    pub operation: Operation,
}

impl GenerationJob {
    /// Create a job, raising `requested_count` to at least `floor`.
    pub fn new(
        table_name: impl Into<String>,
        requested_count: u64,
        floor: u64,
        operation: Operation,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            requested_count: requested_count.max(floor),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_is_enforced() {
        let job = GenerationJob::new("orders", 10, 1000, Operation::Append);
        assert_eq!(job.requested_count, 1000);

        let job = GenerationJob::new("orders", 2500, 1000, Operation::Append);
        assert_eq!(job.requested_count, 2500);
    }

    #[test]
    fn test_only_inspect_is_read_only() {
        assert!(Operation::ClearAndFill.mutates());
        assert!(Operation::Append.mutates());
        assert!(!Operation::InspectOnly.mutates());
    }
}
