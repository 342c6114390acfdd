//! Generation policy: every knob the batch builder honours.

use serde::{Deserialize, Serialize};

/// Default integer range for generated values, before clamping to storage.
pub const DEFAULT_INTEGER_RANGE: (i64, i64) = (0, 9999);

/// Default upper bound on draws for one unique value.
pub const DEFAULT_MAX_UNIQUE_RETRIES: u64 = 10_000;

/// Default number of back-to-back key collisions tolerated under `SkipRow`.
pub const DEFAULT_MAX_CONSECUTIVE_COLLISIONS: u32 = 100;

/// Where identity sequences start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStart {
    /// Continue after the largest stored value (or `start_value` when empty)
    ResumeAfterMax,
    /// Always start at `start_value`
    Fixed,
}

/// What to do when a completed row repeats a primary key of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// End the batch and keep the rows built so far
    StopBatch,
    /// Drop the row and keep building, up to a consecutive-collision limit
    SkipRow,
}

/// Policy for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    /// Identity sequence start rule
    pub identity_start: IdentityStart,

    /// Identity start value (default 1)
    pub start_value: i64,

    /// Emit identity values; when false, generated columns are left to the sink
    pub emit_identity: bool,

    /// Primary-key collision handling
    pub key_collision: CollisionPolicy,

    /// Consecutive collisions tolerated under [`CollisionPolicy::SkipRow`]
    pub max_consecutive_collisions: u32,

    /// Probability of a null for nullable, unconstrained columns
    pub null_probability: f64,

    /// Upper bound on draws for one unique value
    pub max_unique_retries: u64,

    /// Inclusive integer range, intersected with each column's storage range
    pub integer_range: (i64, i64),

    /// Base seed for every RNG derived during the run
    pub seed: u64,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            identity_start: IdentityStart::ResumeAfterMax,
            start_value: 1,
            emit_identity: true,
            key_collision: CollisionPolicy::StopBatch,
            max_consecutive_collisions: DEFAULT_MAX_CONSECUTIVE_COLLISIONS,
            null_probability: 0.0,
            max_unique_retries: DEFAULT_MAX_UNIQUE_RETRIES,
            integer_range: DEFAULT_INTEGER_RANGE,
            seed: 0,
        }
    }
}

impl GenerationPolicy {
    /// Set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the identity start rule and value.
    pub fn with_identity_start(mut self, start: IdentityStart, start_value: i64) -> Self {
        self.identity_start = start;
        self.start_value = start_value;
        self
    }

    /// Set the key-collision policy.
    pub fn with_key_collision(mut self, policy: CollisionPolicy) -> Self {
        self.key_collision = policy;
        self
    }

    /// Set the null probability, clamped to `0.0..=1.0`.
    pub fn with_null_probability(mut self, probability: f64) -> Self {
        self.null_probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the unique retry bound (at least 1).
    pub fn with_max_unique_retries(mut self, retries: u64) -> Self {
        self.max_unique_retries = retries.max(1);
        self
    }

    /// Set the default integer range; the bounds are reordered if needed.
    pub fn with_integer_range(mut self, min: i64, max: i64) -> Self {
        self.integer_range = (min.min(max), min.max(max));
        self
    }

    /// Seed for one table, stable across job reordering.
    pub fn table_seed(&self, table: &str) -> u64 {
        // FNV-1a over the table name
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in table.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        derive_seed(self.seed, hash)
    }
}

/// Combine a base seed with an index.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    base.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15))
}
