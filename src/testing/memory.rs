//! In-memory database server for exercising the orchestrator without MySQL.
//!
//! [`MemoryServer`] implements [`Connector`]; each session it opens works on
//! a shared [`MemoryDatabase`], so tests can inspect table contents after a
//! run. Inserts honour primary keys, unique columns and auto-increment
//! columns the way a relational sink would.

use async_trait::async_trait;
use fill_core::{
    ColumnSpec, Connector, DummyRecord, FieldValue, FillError, RawTableMetadata, RecordSink,
    SchemaProvider, Session,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// One table: its metadata and rows.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    metadata: RawTableMetadata,
    /// Unique columns enforced on insert but not reported by `describe_table`
    hidden_unique: HashSet<String>,
    rows: Vec<DummyRecord>,
    auto_increment: i64,
}

impl MemoryTable {
    pub fn new(metadata: RawTableMetadata) -> Self {
        Self {
            metadata,
            hidden_unique: HashSet::new(),
            rows: Vec::new(),
            auto_increment: 0,
        }
    }

    /// Enforce a unique column the schema provider does not report.
    pub fn with_hidden_unique(mut self, column: impl Into<String>) -> Self {
        self.hidden_unique.insert(column.into());
        self
    }

    /// Pre-populate a row, bypassing constraint checks.
    pub fn with_row(mut self, row: DummyRecord) -> Self {
        for column in &self.metadata.generated_columns {
            if let Some(v) = row.get(column).and_then(FieldValue::as_i64) {
                self.auto_increment = self.auto_increment.max(v);
            }
        }
        self.rows.push(row);
        self
    }

    fn insert(&mut self, table: &str, record: &DummyRecord) -> Result<(), FillError> {
        let mut row = DummyRecord::new();
        let mut assigned_auto = None;

        for column in record.columns() {
            if !self.metadata.columns.iter().any(|c| c.name == column) {
                return Err(FillError::insertion(
                    table,
                    format!("Unknown column '{column}'"),
                ));
            }
        }

        for column in &self.metadata.columns {
            let value = match record.get(&column.name) {
                Some(value) => value.clone(),
                None if self.metadata.generated_columns.contains(&column.name) => {
                    let next = self.auto_increment + 1;
                    assigned_auto = Some(next);
                    FieldValue::Int(next)
                }
                None => FieldValue::Null,
            };
            if value.is_null() && record.get(&column.name).is_some() && !column.nullable {
                return Err(FillError::insertion(
                    table,
                    format!("Column '{}' cannot be null", column.name),
                ));
            }
            row.set(column.name.clone(), value);
        }

        if !self.metadata.primary_key.is_empty() {
            let key = |r: &DummyRecord| -> Vec<FieldValue> {
                self.metadata
                    .primary_key
                    .iter()
                    .map(|c| r.get(c).cloned().unwrap_or(FieldValue::Null))
                    .collect()
            };
            let new_key = key(&row);
            if self.rows.iter().any(|existing| key(existing) == new_key) {
                return Err(FillError::insertion(
                    table,
                    "Duplicate entry for key 'PRIMARY'",
                ));
            }
        }

        for column in self
            .metadata
            .unique_columns
            .iter()
            .chain(self.hidden_unique.iter())
        {
            let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            if self.rows.iter().any(|existing| existing.get(column) == Some(value)) {
                return Err(FillError::insertion(
                    table,
                    format!("Duplicate entry {value} for key '{column}'"),
                ));
            }
        }

        for column in &self.metadata.generated_columns {
            if let Some(v) = row.get(column).and_then(FieldValue::as_i64) {
                self.auto_increment = self.auto_increment.max(v);
            }
        }
        if let Some(next) = assigned_auto {
            self.auto_increment = self.auto_increment.max(next);
        }
        self.rows.push(row);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DatabaseState {
    tables: BTreeMap<String, MemoryTable>,
    /// Tables whose clear/pre-load/read queries fail
    broken: HashSet<String>,
}

/// A shared handle to one in-memory database.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<DatabaseState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DatabaseState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn with_table(self, table: MemoryTable) -> Self {
        let name = table.metadata.name.clone();
        self.lock().tables.insert(name, table);
        self
    }

    /// Make every query other than inserts fail for a table.
    pub fn with_broken_table(self, table: impl Into<String>) -> Self {
        self.lock().broken.insert(table.into());
        self
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<DummyRecord> {
        self.lock()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// A session on this database, outside any connector.
    pub fn session(&self) -> MemorySession {
        MemorySession {
            database: self.clone(),
            closed: false,
        }
    }

    fn check(&self, table: &str) -> Result<(), FillError> {
        if self.lock().broken.contains(table) {
            return Err(FillError::sink(table, "simulated query failure"));
        }
        Ok(())
    }
}

/// A session on a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemorySession {
    database: MemoryDatabase,
    closed: bool,
}

impl MemorySession {
    fn ensure_open(&self, table: &str) -> Result<(), FillError> {
        if self.closed {
            return Err(FillError::sink(table, "session closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaProvider for MemorySession {
    async fn table_names(&mut self) -> Result<Vec<String>, FillError> {
        self.ensure_open("*")?;
        Ok(self.database.lock().tables.keys().cloned().collect())
    }

    async fn describe_table(&mut self, table: &str) -> Result<RawTableMetadata, FillError> {
        self.ensure_open(table)?;
        Ok(self
            .database
            .lock()
            .tables
            .get(table)
            .map(|t| t.metadata.clone())
            .unwrap_or_else(|| RawTableMetadata::new(table)))
    }
}

#[async_trait]
impl RecordSink for MemorySession {
    async fn clear_table(&mut self, table: &str) -> Result<(), FillError> {
        self.ensure_open(table)?;
        self.database.check(table)?;
        let mut state = self.database.lock();
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| FillError::sink(table, "no such table"))?;
        t.rows.clear();
        t.auto_increment = 0;
        Ok(())
    }

    async fn distinct_values(
        &mut self,
        table: &str,
        column: &ColumnSpec,
    ) -> Result<Vec<FieldValue>, FillError> {
        self.ensure_open(table)?;
        self.database.check(table)?;
        let state = self.database.lock();
        let t = state
            .tables
            .get(table)
            .ok_or_else(|| FillError::sink(table, "no such table"))?;

        let mut seen = HashSet::new();
        Ok(t.rows
            .iter()
            .filter_map(|r| r.get(&column.name))
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert((*v).clone()))
            .cloned()
            .collect())
    }

    async fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, FillError> {
        self.ensure_open(table)?;
        self.database.check(table)?;
        let state = self.database.lock();
        let t = state
            .tables
            .get(table)
            .ok_or_else(|| FillError::sink(table, "no such table"))?;
        Ok(t.rows
            .iter()
            .filter_map(|r| r.get(column).and_then(FieldValue::as_i64))
            .max())
    }

    async fn insert_record(&mut self, table: &str, record: &DummyRecord) -> Result<(), FillError> {
        self.ensure_open(table)?;
        let mut state = self.database.lock();
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| FillError::insertion(table, "no such table"))?;
        t.insert(table, record)
    }

    async fn read_records(
        &mut self,
        table: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<DummyRecord>, FillError> {
        self.ensure_open(table)?;
        self.database.check(table)?;
        let state = self.database.lock();
        let t = state
            .tables
            .get(table)
            .ok_or_else(|| FillError::sink(table, "no such table"))?;
        Ok(t.rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn close(&mut self) -> Result<(), FillError> {
        self.closed = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ServerState {
    databases: BTreeMap<String, MemoryDatabase>,
    unreachable: HashSet<String>,
    offline: bool,
    connections: Vec<Option<String>>,
}

/// In-memory server holding named databases.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn with_database(self, name: impl Into<String>, database: MemoryDatabase) -> Self {
        self.lock().databases.insert(name.into(), database);
        self
    }

    /// Refuse connections to one database.
    pub fn with_unreachable(self, name: impl Into<String>) -> Self {
        self.lock().unreachable.insert(name.into());
        self
    }

    /// Refuse every connection.
    pub fn offline(self) -> Self {
        self.lock().offline = true;
        self
    }

    /// Connection attempts so far, in order (`None` for the server itself).
    pub fn connections(&self) -> Vec<Option<String>> {
        self.lock().connections.clone()
    }
}

#[async_trait]
impl Connector for MemoryServer {
    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn Session>, FillError> {
        let mut state = self.lock();
        state.connections.push(database.map(str::to_string));
        let target = database.unwrap_or("server");

        if state.offline {
            return Err(FillError::connection(target, "Connection refused"));
        }

        match database {
            None => Ok(Box::new(MemoryDatabase::new().session())),
            Some(name) if state.unreachable.contains(name) => {
                Err(FillError::connection(name, "Connection refused"))
            }
            Some(name) => match state.databases.get(name) {
                Some(db) => Ok(Box::new(db.session())),
                None => Err(FillError::connection(name, format!("Unknown database '{name}'"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fill_core::RawColumn;

    fn users() -> MemoryTable {
        MemoryTable::new(
            RawTableMetadata::new("users")
                .with_column(RawColumn::new("id", "INT"))
                .with_column(RawColumn::new("email", "VARCHAR").with_length(20))
                .with_primary_key(["id"])
                .with_unique_columns(["email"])
                .with_generated_columns(["id"]),
        )
    }

    fn email(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_insert_enforces_constraints() {
        let db = MemoryDatabase::new().with_table(users());
        let mut session = db.session();

        let a = DummyRecord::new().with("email", email("a@x"));
        session.insert_record("users", &a).await.unwrap();
        assert!(session.insert_record("users", &a).await.is_err());

        let dup_id = DummyRecord::new()
            .with("id", FieldValue::Int(1))
            .with("email", email("b@x"));
        assert!(session.insert_record("users", &dup_id).await.is_err());

        let b = DummyRecord::new().with("email", email("b@x"));
        session.insert_record("users", &b).await.unwrap();

        let ids: Vec<_> = db
            .rows("users")
            .iter()
            .map(|r| r.get("id").and_then(FieldValue::as_i64).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_hidden_unique_is_enforced_but_not_described() {
        let db = MemoryDatabase::new().with_table(users().with_hidden_unique("id"));
        let mut session = db.session();

        let metadata = session.describe_table("users").await.unwrap();
        assert!(!metadata.unique_columns.contains("id"));

        let a = DummyRecord::new()
            .with("id", FieldValue::Int(5))
            .with("email", email("a@x"));
        session.insert_record("users", &a).await.unwrap();
        assert_eq!(session.max_value("users", "id").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_connector() {
        let server = MemoryServer::new()
            .with_database("shop", MemoryDatabase::new().with_table(users()))
            .with_unreachable("hr");

        let mut session = server.connect(Some("shop")).await.unwrap();
        assert_eq!(session.table_names().await.unwrap(), vec!["users"]);
        session.close().await.unwrap();
        assert!(session.table_names().await.is_err());

        assert!(server.connect(Some("hr")).await.is_err());
        assert!(server.connect(Some("missing")).await.is_err());
        assert_eq!(
            server.connections(),
            vec![
                Some("shop".to_string()),
                Some("hr".to_string()),
                Some("missing".to_string())
            ]
        );
    }
}
