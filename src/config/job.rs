//! Per-database job file.

use super::ConfigError;
use fill_core::{GenerationJob, Operation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::warn;

/// Default minimum number of records generated per table.
pub const DEFAULT_MIN_RECORDS: u64 = 1000;

/// Command word stored in a job file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Clear each table, then fill it
    Truncate,
    /// Add records on top of the existing rows
    Insert,
    /// Print the current rows without changing anything
    View,
}

impl From<Command> for Operation {
    fn from(command: Command) -> Self {
        match command {
            Command::Truncate => Operation::ClearAndFill,
            Command::Insert => Operation::Append,
            Command::View => Operation::InspectOnly,
        }
    }
}

/// Contents of `<config_dir>/<server>/<database>.yaml`.
///
/// ```yaml
/// command: truncate
/// table_names: [orders, customers]
/// dummy_nums: { orders: 5000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub command: Command,

    #[serde(default)]
    pub table_names: Vec<String>,

    #[serde(default)]
    pub dummy_nums: BTreeMap<String, u64>,
}

impl JobConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build a job file from `(table, count)` entries, keeping only tables
    /// that exist and dropping duplicates with a warning.
    pub fn from_entries(command: Command, entries: &[(String, u64)], live_tables: &[String]) -> Self {
        let live: HashSet<&str> = live_tables.iter().map(String::as_str).collect();
        let mut table_names = Vec::new();
        let mut dummy_nums = BTreeMap::new();

        for (table, count) in entries {
            if dummy_nums.contains_key(table) {
                warn!("Duplicate table name {table}, skipping");
                continue;
            }
            if !live.contains(table.as_str()) {
                warn!("Table {table} does not exist in the database, skipping");
                continue;
            }
            table_names.push(table.clone());
            dummy_nums.insert(table.clone(), *count);
        }

        Self {
            command,
            table_names,
            dummy_nums,
        }
    }

    /// Expand into one job per table, in file order.
    ///
    /// Counts missing from `dummy_nums` or below `floor` are raised to `floor`.
    /// A table listed more than once runs only at its first position.
    pub fn jobs(&self, floor: u64) -> Result<Vec<GenerationJob>, ConfigError> {
        if self.table_names.is_empty() {
            return Err(ConfigError::NoTables);
        }

        let operation = Operation::from(self.command);
        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(self.table_names.len());
        for table in &self.table_names {
            if !seen.insert(table.as_str()) {
                warn!("Duplicate table name {table} in job file, skipping");
                continue;
            }
            let count = self.dummy_nums.get(table).copied().unwrap_or(floor);
            jobs.push(GenerationJob::new(table.clone(), count, floor, operation));
        }
        Ok(jobs)
    }
}

/// Parse `"orders:5000, customers:2000"` into `(table, count)` pairs.
///
/// Entries without a count or with a malformed count are warned about and
/// skipped.
pub fn parse_table_counts(spec: &str) -> Vec<(String, u64)> {
    let mut entries = Vec::new();

    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((table, count)) = entry.split_once(':') else {
            warn!("Missing record count for table {entry}, skipping");
            continue;
        };
        let table = table.trim();
        match count.trim().parse::<u64>() {
            Ok(count) if !table.is_empty() => entries.push((table.to_string(), count)),
            Ok(_) => warn!("Empty table name in entry '{entry}', skipping"),
            Err(_) => warn!("Invalid record count for table {table}, skipping"),
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_mapping() {
        assert_eq!(Operation::from(Command::Truncate), Operation::ClearAndFill);
        assert_eq!(Operation::from(Command::Insert), Operation::Append);
        assert_eq!(Operation::from(Command::View), Operation::InspectOnly);
    }

    #[test]
    fn test_jobs_apply_floor() {
        let config = JobConfig::from_yaml(
            r#"
command: insert
table_names: [orders, customers, items]
dummy_nums:
  orders: 5000
  customers: 10
"#,
        )
        .unwrap();

        let jobs = config.jobs(DEFAULT_MIN_RECORDS).unwrap();
        let summary: Vec<_> = jobs
            .iter()
            .map(|j| (j.table_name.as_str(), j.requested_count))
            .collect();
        assert_eq!(
            summary,
            vec![("orders", 5000), ("customers", 1000), ("items", 1000)]
        );
        assert!(jobs.iter().all(|j| j.operation == Operation::Append));
    }

    #[test]
    fn test_duplicate_tables_run_once() {
        let config = JobConfig::from_yaml(
            r#"
command: truncate
table_names: [orders, customers, orders]
dummy_nums:
  orders: 5
"#,
        )
        .unwrap();

        let jobs = config.jobs(1).unwrap();
        let tables: Vec<_> = jobs.iter().map(|j| j.table_name.as_str()).collect();
        assert_eq!(tables, vec!["orders", "customers"]);
        assert_eq!(jobs[0].requested_count, 5);
    }

    #[test]
    fn test_empty_table_list_is_an_error() {
        let config = JobConfig::from_yaml("command: view\n").unwrap();
        assert!(matches!(config.jobs(1), Err(ConfigError::NoTables)));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(JobConfig::from_yaml("command: drop\ntable_names: [a]\n").is_err());
    }

    #[test]
    fn test_parse_table_counts() {
        let entries = parse_table_counts("orders:5000, customers : 20 ,bad:x, nocount, :5,");
        assert_eq!(
            entries,
            vec![("orders".to_string(), 5000), ("customers".to_string(), 20)]
        );
    }

    #[test]
    fn test_from_entries_filters() {
        let entries = vec![
            ("orders".to_string(), 10),
            ("ghost".to_string(), 10),
            ("orders".to_string(), 99),
            ("customers".to_string(), 5),
        ];
        let live = vec!["orders".to_string(), "customers".to_string()];

        let config = JobConfig::from_entries(Command::Truncate, &entries, &live);
        assert_eq!(config.table_names, vec!["orders", "customers"]);
        assert_eq!(config.dummy_nums.get("orders"), Some(&10));

        let yaml = config.to_yaml().unwrap();
        assert_eq!(JobConfig::from_yaml(&yaml).unwrap(), config);
        assert!(yaml.contains("command: truncate"));
    }
}
