//! In-batch primary-key collision detection.

use fill_core::{DummyRecord, FieldValue};
use std::collections::HashSet;

/// A completed row repeated a primary key already seen in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyCollision {
    /// Key columns, in schema order
    pub columns: Vec<String>,
    /// The repeated key tuple
    pub key: Vec<FieldValue>,
}

impl PrimaryKeyCollision {
    /// Human-readable key, e.g. `(id, code) = (1, 'ab')`.
    pub fn describe(&self) -> String {
        let values: Vec<String> = self.key.iter().map(ToString::to_string).collect();
        format!("({}) = ({})", self.columns.join(", "), values.join(", "))
    }
}

/// Tracks the key tuples of one batch.
#[derive(Debug, Clone, Default)]
pub struct PrimaryKeyGuard {
    columns: Vec<String>,
    seen: HashSet<Vec<FieldValue>>,
}

impl PrimaryKeyGuard {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            seen: HashSet::new(),
        }
    }

    /// Whether the table has a primary key to guard at all.
    pub fn is_active(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Number of distinct keys admitted.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Admit a completed row, or report that its key was already seen.
    ///
    /// Rows that leave a key column to the sink cannot be checked here and
    /// are admitted as-is.
    pub fn admit(&mut self, record: &DummyRecord) -> Result<(), PrimaryKeyCollision> {
        if !self.is_active() {
            return Ok(());
        }

        let mut key = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            match record.get(column) {
                Some(value) => key.push(value.clone()),
                None => return Ok(()),
            }
        }

        if self.seen.contains(&key) {
            return Err(PrimaryKeyCollision {
                columns: self.columns.clone(),
                key,
            });
        }
        self.seen.insert(key);
        Ok(())
    }
}
