//! Per-column value streams.

use crate::generators::generate_value;
use crate::policy::GenerationPolicy;
use fill_core::{ColumnSpec, FieldValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lazy, infinite stream of candidate values for one column.
///
/// Each stream owns a seeded RNG, so two streams built from the same column,
/// policy and seed yield the same values, and [`FieldGenerator::restart`]
/// rewinds a stream to its first value. Generated (identity) columns are
/// sequenced elsewhere and never get a stream.
pub struct FieldGenerator {
    column: ColumnSpec,
    policy: GenerationPolicy,
    seed: u64,
    rng: StdRng,
}

impl FieldGenerator {
    /// Create a stream for a column.
    pub fn new(column: ColumnSpec, policy: &GenerationPolicy, seed: u64) -> Self {
        Self {
            column,
            policy: policy.clone(),
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The column this stream fills.
    pub fn column(&self) -> &ColumnSpec {
        &self.column
    }

    /// Rewind to the first value.
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Draw the next candidate value.
    pub fn next_value(&mut self) -> FieldValue {
        if self.column.accepts_generated_null() && self.policy.null_probability > 0.0 {
            let p = self.policy.null_probability.min(1.0);
            if self.rng.gen_bool(p) {
                return FieldValue::Null;
            }
        }
        generate_value(&self.column.category, &mut self.rng, &self.policy)
    }
}

impl Iterator for FieldGenerator {
    type Item = FieldValue;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
