//! Uniqueness resolver for columns under a uniqueness constraint.

use crate::field::FieldGenerator;
use crate::generators::value_space;
use crate::policy::GenerationPolicy;
use fill_core::FieldValue;
use std::collections::HashSet;
use std::fmt;

/// Fewest draws attempted for one value, however crowded the space.
pub const MIN_UNIQUE_RETRIES: u64 = 16;

/// Expected draws are multiplied by this to form the retry budget.
const RETRY_FACTOR: u128 = 8;

/// No further distinct value could be found for a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationExhausted {
    /// Column whose value space ran out
    pub column: String,
    /// Draws spent on the failed value
    pub attempts: u64,
    /// Values already taken when the budget ran out
    pub taken: usize,
}

impl fmt::Display for GenerationExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no distinct value for column '{}' after {} attempts ({} values taken)",
            self.column, self.attempts, self.taken
        )
    }
}

/// Filters a column's value stream against values already taken.
///
/// The taken set starts with the values pre-loaded from the sink and grows
/// with every value handed out, so it only ever grows during a batch.
pub struct UniquenessResolver {
    generator: FieldGenerator,
    taken: HashSet<FieldValue>,
    space: Option<u128>,
    max_retries: u64,
}

impl UniquenessResolver {
    /// Wrap a value stream, seeding the taken set with existing values.
    pub fn new(
        generator: FieldGenerator,
        existing: impl IntoIterator<Item = FieldValue>,
        policy: &GenerationPolicy,
    ) -> Self {
        let space = value_space(&generator.column().category, policy);
        let taken = existing.into_iter().filter(|v| !v.is_null()).collect();
        Self {
            generator,
            taken,
            space,
            max_retries: policy.max_unique_retries.max(1),
        }
    }

    /// Column name.
    pub fn column_name(&self) -> &str {
        &self.generator.column().name
    }

    /// Number of values taken so far (pre-loaded plus handed out).
    pub fn taken(&self) -> usize {
        self.taken.len()
    }

    /// Whether a value is already taken.
    pub fn contains(&self, value: &FieldValue) -> bool {
        self.taken.contains(value)
    }

    /// Draws allowed for the next value.
    ///
    /// With `S` reachable values and `k` taken, a fresh value needs about
    /// `S / (S - k)` draws; the budget is eight times that, clamped to
    /// `[16, max_unique_retries]`.
    pub fn retry_budget(&self) -> u64 {
        let floor = MIN_UNIQUE_RETRIES.min(self.max_retries);
        let Some(space) = self.space else {
            return self.max_retries;
        };

        let remaining = space.saturating_sub(self.taken.len() as u128);
        if remaining == 0 {
            return floor;
        }

        let expected = space.div_ceil(remaining);
        let budget = expected.saturating_mul(RETRY_FACTOR);
        budget.clamp(floor as u128, self.max_retries as u128) as u64
    }

    /// Draw until an untaken value appears or the budget runs out.
    pub fn next_value(&mut self) -> Result<FieldValue, GenerationExhausted> {
        let budget = self.retry_budget();

        for _ in 0..budget {
            let candidate = self.generator.next_value();
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }

        Err(GenerationExhausted {
            column: self.column_name().to_string(),
            attempts: budget,
            taken: self.taken.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fill_core::{ColumnSpec, TypeCategory};

    fn resolver(
        category: TypeCategory,
        existing: Vec<FieldValue>,
        policy: &GenerationPolicy,
    ) -> UniquenessResolver {
        let column = ColumnSpec::new("c", category).unique();
        UniquenessResolver::new(FieldGenerator::new(column, policy, 42), existing, policy)
    }

    #[test]
    fn test_values_are_distinct() {
        let policy = GenerationPolicy::default();
        let mut resolver = resolver(TypeCategory::ShortText { max_length: 3 }, vec![], &policy);

        let mut seen = HashSet::new();
        for _ in 0..500 {
            let value = resolver.next_value().unwrap();
            assert!(seen.insert(value));
        }
        assert_eq!(resolver.taken(), 500);
    }

    #[test]
    fn test_existing_values_are_avoided() {
        let policy = GenerationPolicy::default().with_integer_range(1, 20);
        let existing: Vec<_> = (1..=15).map(FieldValue::Int).collect();
        let mut resolver = resolver(
            TypeCategory::Integer {
                min: i32::MIN as i64,
                max: i32::MAX as i64,
            },
            existing,
            &policy,
        );

        let mut fresh = HashSet::new();
        while let Ok(value) = resolver.next_value() {
            assert!(fresh.insert(value.as_i64().unwrap()));
        }

        assert!(!fresh.is_empty());
        assert!(fresh.iter().all(|v| (16..=20).contains(v)));
    }

    #[test]
    fn test_exhaustion_is_reported() {
        let policy = GenerationPolicy::default();
        let mut resolver = resolver(TypeCategory::Bool, vec![], &policy);

        assert!(resolver.next_value().is_ok());
        assert!(resolver.next_value().is_ok());

        let err = resolver.next_value().unwrap_err();
        assert_eq!(err.column, "c");
        assert_eq!(err.taken, 2);
        assert_eq!(err.attempts, MIN_UNIQUE_RETRIES);
    }

    #[test]
    fn test_retry_budget() {
        let policy = GenerationPolicy::default();

        // Unbounded space uses the policy maximum
        let r = resolver(TypeCategory::LongText, vec![], &policy);
        assert_eq!(r.retry_budget(), policy.max_unique_retries);

        // Empty 26-value space: ceil(26/26) * 8 = 8, raised to the floor
        let r = resolver(TypeCategory::ShortText { max_length: 1 }, vec![], &policy);
        assert_eq!(r.retry_budget(), MIN_UNIQUE_RETRIES);

        // One value left out of 26: 26 * 8
        let existing: Vec<_> = (b'a'..b'z')
            .map(|c| FieldValue::Text((c as char).to_string()))
            .collect();
        assert_eq!(existing.len(), 25);
        let r = resolver(TypeCategory::ShortText { max_length: 1 }, existing, &policy);
        assert_eq!(r.retry_budget(), 208);

        // Capped by the policy
        let tight = GenerationPolicy::default().with_max_unique_retries(5);
        let r = resolver(TypeCategory::LongText, vec![], &tight);
        assert_eq!(r.retry_budget(), 5);
        let r = resolver(TypeCategory::Bool, vec![], &tight);
        assert_eq!(r.retry_budget(), 5);
    }

    #[test]
    fn test_nulls_in_existing_values_are_ignored() {
        let policy = GenerationPolicy::default();
        let r = resolver(
            TypeCategory::Bool,
            vec![FieldValue::Null, FieldValue::Bool(true)],
            &policy,
        );
        assert_eq!(r.taken(), 1);
        assert!(r.contains(&FieldValue::Bool(true)));
    }
}
