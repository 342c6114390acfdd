//! Table job orchestration.
//!
//! A [`DatabaseRunner`] opens one session per database and hands each table
//! job to [`run_table`], which walks the table through
//! `Pending → (Cleared) → Generated → Inserted → Reported → Done`, or straight
//! to `Reported → Done` for inspection. Everything runs strictly in order:
//! databases in the order given, tables in job-file order, rows in the order
//! they were built.

pub mod database;
pub mod table;

pub use database::{resolve_databases, DatabaseReport, DatabaseRunner, RunReport};
pub use table::{run_table, TableOutcome, TableReport, TableState};

use crate::config::DEFAULT_MIN_RECORDS;
use fill_generator::GenerationPolicy;

/// Default number of rows read per page when inspecting a table.
pub const DEFAULT_INSPECT_PAGE_SIZE: u64 = 1000;

/// Settings shared by every table of a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub policy: GenerationPolicy,
    /// Floor applied to every requested record count
    pub min_records: u64,
    pub inspect_page_size: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            policy: GenerationPolicy::default(),
            min_records: DEFAULT_MIN_RECORDS,
            inspect_page_size: DEFAULT_INSPECT_PAGE_SIZE,
        }
    }
}

impl RunSettings {
    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_min_records(mut self, min_records: u64) -> Self {
        self.min_records = min_records;
        self
    }

    pub fn with_inspect_page_size(mut self, page_size: u64) -> Self {
        self.inspect_page_size = page_size.max(1);
        self
    }
}
