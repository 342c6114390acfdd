//! Identity sequencing for generated (auto-increment) columns.

use crate::policy::{GenerationPolicy, IdentityStart};
use fill_core::FieldValue;

/// Monotonic counter for one generated column.
///
/// Each generated column gets its own sequencer; nothing else in the row
/// influences it and its values never need a uniqueness check.
#[derive(Debug, Clone)]
pub struct IdentitySequencer {
    column: String,
    next: i64,
}

impl IdentitySequencer {
    /// Start a sequence at an explicit value.
    pub fn starting_at(column: impl Into<String>, start: i64) -> Self {
        Self {
            column: column.into(),
            next: start,
        }
    }

    /// Start a sequence per policy, given the largest value already stored.
    pub fn from_policy(
        column: impl Into<String>,
        policy: &GenerationPolicy,
        existing_max: Option<i64>,
    ) -> Self {
        let start = match (policy.identity_start, existing_max) {
            (IdentityStart::ResumeAfterMax, Some(max)) => {
                max.saturating_add(1).max(policy.start_value)
            }
            _ => policy.start_value,
        };
        Self::starting_at(column, start)
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    /// The value the next call will hand out.
    pub fn peek(&self) -> i64 {
        self.next
    }

    /// Hand out the next value and advance by one.
    pub fn next_value(&mut self) -> FieldValue {
        let value = self.next;
        self.next = self.next.saturating_add(1);
        FieldValue::Int(value)
    }
}
