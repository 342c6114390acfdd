//! Record batch builder: composes the per-column generators row by row.

use crate::field::FieldGenerator;
use crate::guard::{PrimaryKeyCollision, PrimaryKeyGuard};
use crate::policy::{derive_seed, CollisionPolicy, GenerationPolicy};
use crate::sequence::IdentitySequencer;
use crate::unique::{GenerationExhausted, UniquenessResolver};
use fill_core::{DummyRecord, FieldValue, TableSchema};
use std::collections::HashMap;
use tracing::{debug, warn};

/// What the sink already holds for a table before the batch starts.
///
/// Empty after a clear; for an append it carries the pre-loaded unique
/// values and the largest stored identity per generated column.
#[derive(Debug, Clone, Default)]
pub struct ExistingState {
    pub unique_values: HashMap<String, Vec<FieldValue>>,
    pub identity_max: HashMap<String, i64>,
}

impl ExistingState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_unique_values(mut self, column: impl Into<String>, values: Vec<FieldValue>) -> Self {
        self.unique_values.insert(column.into(), values);
        self
    }

    pub fn with_identity_max(mut self, column: impl Into<String>, max: i64) -> Self {
        self.identity_max.insert(column.into(), max);
        self
    }
}

/// Why a batch stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchTermination {
    /// All requested rows were built
    Completed,
    /// A unique column ran out of distinct values
    Exhausted(GenerationExhausted),
    /// A primary-key collision ended the batch
    KeyCollision(PrimaryKeyCollision),
}

impl BatchTermination {
    /// Whether the batch ended before reaching the requested count.
    pub fn is_truncated(&self) -> bool {
        !matches!(self, BatchTermination::Completed)
    }

    pub fn describe(&self) -> String {
        match self {
            BatchTermination::Completed => "completed".to_string(),
            BatchTermination::Exhausted(e) => format!("generation exhausted: {e}"),
            BatchTermination::KeyCollision(c) => {
                format!("primary key collision on {}", c.describe())
            }
        }
    }
}

/// Rows built for one table, plus how the batch ended.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub records: Vec<DummyRecord>,
    pub termination: BatchTermination,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

enum ColumnSource {
    Identity(IdentitySequencer),
    Unique(UniquenessResolver),
    Plain(FieldGenerator),
}

struct ColumnSlot {
    name: String,
    source: ColumnSource,
}

/// Builds batches of records for one table.
///
/// Generated columns take values from an [`IdentitySequencer`] (or are left
/// to the sink when the policy disables identity emission), unique columns
/// go through a [`UniquenessResolver`], unsupported columns are omitted and
/// everything else draws straight from a [`FieldGenerator`]. Each column's
/// RNG is seeded from the policy seed, the table name and the column's
/// position, so a fixed seed reproduces the same batch.
pub struct BatchBuilder<'a> {
    schema: &'a TableSchema,
    policy: &'a GenerationPolicy,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(schema: &'a TableSchema, policy: &'a GenerationPolicy) -> Self {
        Self { schema, policy }
    }

    fn slots(&self, existing: &ExistingState) -> Vec<ColumnSlot> {
        let table_seed = self.policy.table_seed(&self.schema.name);
        let mut slots = Vec::with_capacity(self.schema.columns.len());

        for (index, column) in self.schema.columns.iter().enumerate() {
            let source = if column.is_generated {
                if !self.policy.emit_identity {
                    continue;
                }
                let max = existing.identity_max.get(&column.name).copied();
                ColumnSource::Identity(IdentitySequencer::from_policy(
                    column.name.clone(),
                    self.policy,
                    max,
                ))
            } else if !column.category.is_supported() {
                debug!(
                    "Omitting column {}.{} of unsupported type",
                    self.schema.name, column.name
                );
                continue;
            } else {
                let seed = derive_seed(table_seed, index as u64);
                let generator = FieldGenerator::new(column.clone(), self.policy, seed);
                if column.tracks_uniqueness() {
                    let taken = existing
                        .unique_values
                        .get(&column.name)
                        .cloned()
                        .unwrap_or_default();
                    ColumnSource::Unique(UniquenessResolver::new(generator, taken, self.policy))
                } else {
                    ColumnSource::Plain(generator)
                }
            };

            slots.push(ColumnSlot {
                name: column.name.clone(),
                source,
            });
        }

        slots
    }

    /// Build at most `requested` rows.
    ///
    /// The batch stops early when a unique column is exhausted or when the
    /// primary-key guard reports a collision that the policy does not skip.
    pub fn build(&self, requested: usize, existing: &ExistingState) -> BatchOutcome {
        let table = &self.schema.name;
        let mut slots = self.slots(existing);
        let key_columns: Vec<String> = self
            .schema
            .primary_key_columns()
            .map(|c| c.name.clone())
            .collect();
        let mut guard = PrimaryKeyGuard::new(key_columns);

        let mut records = Vec::with_capacity(requested.min(65_536));
        let mut consecutive_collisions: u32 = 0;
        let collision_limit = self.policy.max_consecutive_collisions.max(1);

        let termination = loop {
            if records.len() >= requested {
                break BatchTermination::Completed;
            }

            let record = match next_record(&mut slots) {
                Ok(record) => record,
                Err(exhausted) => {
                    warn!(
                        "Stopping batch for {table} after {} of {requested} rows: {exhausted}",
                        records.len()
                    );
                    break BatchTermination::Exhausted(exhausted);
                }
            };

            match guard.admit(&record) {
                Ok(()) => {
                    commit_identities(&mut slots);
                    consecutive_collisions = 0;
                    records.push(record);
                }
                Err(collision) => {
                    consecutive_collisions += 1;
                    let give_up = match self.policy.key_collision {
                        CollisionPolicy::StopBatch => true,
                        CollisionPolicy::SkipRow => consecutive_collisions >= collision_limit,
                    };
                    if give_up {
                        warn!(
                            "Stopping batch for {table} after {} of {requested} rows: primary key collision on {}",
                            records.len(),
                            collision.describe()
                        );
                        break BatchTermination::KeyCollision(collision);
                    }
                    debug!(
                        "Skipping row for {table}: primary key collision on {}",
                        collision.describe()
                    );
                }
            }
        };

        debug!("Built {} rows for {table}", records.len());
        BatchOutcome {
            records,
            termination,
        }
    }
}

/// Assemble one row in schema order. Identity sequencers are only peeked;
/// they advance once the row is admitted.
fn next_record(slots: &mut [ColumnSlot]) -> Result<DummyRecord, GenerationExhausted> {
    let mut record = DummyRecord::new();
    for slot in slots.iter_mut() {
        let value = match &mut slot.source {
            ColumnSource::Identity(seq) => FieldValue::Int(seq.peek()),
            ColumnSource::Unique(resolver) => resolver.next_value()?,
            ColumnSource::Plain(generator) => generator.next_value(),
        };
        record.set(slot.name.clone(), value);
    }
    Ok(record)
}

fn commit_identities(slots: &mut [ColumnSlot]) {
    for slot in slots.iter_mut() {
        if let ColumnSource::Identity(seq) = &mut slot.source {
            seq.next_value();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::IdentityStart;
    use fill_core::{ColumnSpec, TypeCategory};
    use std::collections::HashSet;

    fn orders_schema() -> TableSchema {
        TableSchema::new(
            "orders",
            vec![
                ColumnSpec::new(
                    "id",
                    TypeCategory::Integer {
                        min: i32::MIN as i64,
                        max: i32::MAX as i64,
                    },
                )
                .primary_key()
                .generated(),
                ColumnSpec::new("code", TypeCategory::ShortText { max_length: 5 }).unique(),
                ColumnSpec::new(
                    "status",
                    TypeCategory::Enumerated {
                        options: vec!["open".to_string(), "closed".to_string()],
                    },
                ),
            ],
        )
        .unwrap()
    }

    fn ids(outcome: &BatchOutcome) -> Vec<i64> {
        outcome
            .records
            .iter()
            .map(|r| r.get("id").and_then(FieldValue::as_i64).unwrap())
            .collect()
    }

    #[test]
    fn test_orders_scenario() {
        let schema = orders_schema();
        let policy = GenerationPolicy::default().with_seed(42);
        let outcome = BatchBuilder::new(&schema, &policy).build(3, &ExistingState::empty());

        assert_eq!(outcome.termination, BatchTermination::Completed);
        assert_eq!(ids(&outcome), vec![1, 2, 3]);

        let codes: HashSet<_> = outcome
            .records
            .iter()
            .map(|r| r.get("code").unwrap().clone())
            .collect();
        assert_eq!(codes.len(), 3);

        for record in &outcome.records {
            let code = record.get("code").and_then(FieldValue::as_str).unwrap();
            assert!(!code.is_empty() && code.len() <= 5);
            let status = record.get("status").and_then(FieldValue::as_str).unwrap();
            assert!(status == "open" || status == "closed");
            assert_eq!(record.columns().collect::<Vec<_>>(), vec!["id", "code", "status"]);
        }
    }

    #[test]
    fn test_orders_append_resumes_after_max() {
        let schema = orders_schema();
        let policy = GenerationPolicy::default().with_seed(42);
        let existing = ExistingState::empty()
            .with_identity_max("id", 10)
            .with_unique_values("code", vec![FieldValue::Text("abc".to_string())]);

        let outcome = BatchBuilder::new(&schema, &policy).build(3, &existing);
        assert_eq!(ids(&outcome), vec![11, 12, 13]);
        assert!(outcome
            .records
            .iter()
            .all(|r| r.get("code") != Some(&FieldValue::Text("abc".to_string()))));
    }

    #[test]
    fn test_fixed_identity_start() {
        let schema = orders_schema();
        let policy = GenerationPolicy::default()
            .with_seed(1)
            .with_identity_start(IdentityStart::Fixed, 1);
        let existing = ExistingState::empty().with_identity_max("id", 10);

        let outcome = BatchBuilder::new(&schema, &policy).build(2, &existing);
        assert_eq!(ids(&outcome), vec![1, 2]);
    }

    #[test]
    fn test_unique_single_letter_exhausts() {
        let schema = TableSchema::new(
            "letters",
            vec![ColumnSpec::new("letter", TypeCategory::ShortText { max_length: 1 }).unique()],
        )
        .unwrap();
        let policy = GenerationPolicy::default().with_seed(7);

        let outcome = BatchBuilder::new(&schema, &policy).build(100, &ExistingState::empty());

        assert!(outcome.len() < 100);
        assert!(outcome.len() <= 26);
        match &outcome.termination {
            BatchTermination::Exhausted(e) => assert_eq!(e.column, "letter"),
            other => panic!("Expected exhaustion, got {other:?}"),
        }

        let distinct: HashSet<_> = outcome.records.iter().map(|r| r.get("letter").cloned()).collect();
        assert_eq!(distinct.len(), outcome.len());
    }

    #[test]
    fn test_key_collision_stops_batch() {
        let schema = TableSchema::new(
            "flags",
            vec![ColumnSpec::new("flag", TypeCategory::Bool).primary_key()],
        )
        .unwrap();
        let policy = GenerationPolicy::default().with_seed(3);

        let outcome = BatchBuilder::new(&schema, &policy).build(10, &ExistingState::empty());

        assert!(outcome.len() <= 2);
        assert!(matches!(outcome.termination, BatchTermination::KeyCollision(_)));
    }

    #[test]
    fn test_skip_row_keeps_going() {
        let schema = TableSchema::new(
            "flags",
            vec![ColumnSpec::new("flag", TypeCategory::Bool).primary_key()],
        )
        .unwrap();
        let policy = GenerationPolicy::default()
            .with_seed(3)
            .with_key_collision(CollisionPolicy::SkipRow);

        let outcome = BatchBuilder::new(&schema, &policy).build(10, &ExistingState::empty());

        // Both booleans appear before the consecutive-collision limit
        assert_eq!(outcome.len(), 2);
        assert!(matches!(outcome.termination, BatchTermination::KeyCollision(_)));
    }

    #[test]
    fn test_identity_not_advanced_by_skipped_rows() {
        let schema = TableSchema::new(
            "pairs",
            vec![
                ColumnSpec::new("flag", TypeCategory::Bool).primary_key(),
                ColumnSpec::new(
                    "seq",
                    TypeCategory::Integer {
                        min: 0,
                        max: i64::MAX,
                    },
                )
                .generated(),
            ],
        )
        .unwrap();
        let policy = GenerationPolicy::default()
            .with_seed(5)
            .with_key_collision(CollisionPolicy::SkipRow);

        let outcome = BatchBuilder::new(&schema, &policy).build(2, &ExistingState::empty());
        let seqs: Vec<_> = outcome
            .records
            .iter()
            .map(|r| r.get("seq").and_then(FieldValue::as_i64).unwrap())
            .collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn test_identity_left_to_sink() {
        let schema = orders_schema();
        let mut policy = GenerationPolicy::default().with_seed(9);
        policy.emit_identity = false;

        let outcome = BatchBuilder::new(&schema, &policy).build(5, &ExistingState::empty());
        assert_eq!(outcome.len(), 5);
        assert!(outcome.records.iter().all(|r| r.get("id").is_none()));
    }

    #[test]
    fn test_unsupported_columns_are_omitted() {
        let schema = TableSchema::new(
            "docs",
            vec![
                ColumnSpec::new("body", TypeCategory::LongText),
                ColumnSpec::new(
                    "meta",
                    TypeCategory::Unsupported {
                        declared: "JSON".to_string(),
                    },
                ),
            ],
        )
        .unwrap();
        let policy = GenerationPolicy::default().with_seed(9);

        let outcome = BatchBuilder::new(&schema, &policy).build(4, &ExistingState::empty());
        assert_eq!(outcome.len(), 4);
        for record in &outcome.records {
            assert_eq!(record.columns().collect::<Vec<_>>(), vec!["body"]);
        }
    }

    #[test]
    fn test_never_exceeds_requested() {
        let schema = orders_schema();
        let policy = GenerationPolicy::default().with_seed(11);
        let builder = BatchBuilder::new(&schema, &policy);

        for requested in [0, 1, 17, 250] {
            let outcome = builder.build(requested, &ExistingState::empty());
            assert_eq!(outcome.len(), requested);
        }
    }

    #[test]
    fn test_same_seed_same_batch() {
        let schema = orders_schema();
        let policy = GenerationPolicy::default().with_seed(123);

        let a = BatchBuilder::new(&schema, &policy).build(20, &ExistingState::empty());
        let b = BatchBuilder::new(&schema, &policy).build(20, &ExistingState::empty());
        assert_eq!(a.records, b.records);
    }
}
