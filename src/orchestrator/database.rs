//! Runs every table of every requested database, one at a time.

use super::table::{run_table, TableReport};
use super::RunSettings;
use crate::config::{ConfigError, ConfigProvider, ServerEntry};
use fill_core::{Connector, FillError, SchemaProvider};
use std::io::Write;
use tracing::{error, info, warn};

/// What happened to one database.
#[derive(Debug)]
pub struct DatabaseReport {
    pub database: String,
    /// Set when the database was skipped before any table ran
    pub error: Option<FillError>,
    pub tables: Vec<TableReport>,
}

impl DatabaseReport {
    fn skipped(database: &str, err: FillError) -> Self {
        error!("Skipping database {database}: {err}");
        Self {
            database: database.to_string(),
            error: Some(err),
            tables: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.error.is_some()
    }

    pub fn inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

/// Reports for a whole run, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub databases: Vec<DatabaseReport>,
}

impl RunReport {
    pub fn inserted(&self) -> usize {
        self.databases.iter().map(DatabaseReport::inserted).sum()
    }

    /// Tables that ended without reaching `Done`, as `(database, table)`.
    pub fn unfinished_tables(&self) -> Vec<(&str, &str)> {
        self.databases
            .iter()
            .flat_map(|db| {
                db.tables
                    .iter()
                    .filter(|t| !t.is_done())
                    .map(move |t| (db.database.as_str(), t.table.as_str()))
            })
            .collect()
    }

    pub fn skipped_databases(&self) -> Vec<&str> {
        self.databases
            .iter()
            .filter(|db| db.is_skipped())
            .map(|db| db.database.as_str())
            .collect()
    }
}

/// Databases to process: the explicit list, or the server's `dbnames`.
pub fn resolve_databases(
    server_name: &str,
    server: &ServerEntry,
    requested: &[String],
) -> Result<Vec<String>, ConfigError> {
    let databases = if requested.is_empty() {
        server.dbnames.clone()
    } else {
        requested.to_vec()
    };
    if databases.is_empty() {
        return Err(ConfigError::NoDatabases(server_name.to_string()));
    }
    Ok(databases)
}

/// Drives table jobs for the databases of one server.
pub struct DatabaseRunner<'a> {
    connector: &'a dyn Connector,
    provider: &'a dyn ConfigProvider,
    server: String,
    settings: &'a RunSettings,
}

impl<'a> DatabaseRunner<'a> {
    pub fn new(
        connector: &'a dyn Connector,
        provider: &'a dyn ConfigProvider,
        server: impl Into<String>,
        settings: &'a RunSettings,
    ) -> Self {
        Self {
            connector,
            provider,
            server: server.into(),
            settings,
        }
    }

    /// Process databases in order.
    ///
    /// Fails before touching any table if a database has no job file or if
    /// the server cannot be reached at all. Failures inside one database only
    /// skip that database.
    pub async fn run<W: Write + ?Sized>(
        &self,
        databases: &[String],
        out: &mut W,
    ) -> Result<RunReport, FillError> {
        for database in databases {
            if !self.provider.has_job_config(&self.server, database) {
                return Err(ConfigError::MissingJob {
                    server: self.server.clone(),
                    database: database.clone(),
                }
                .into());
            }
        }

        let mut probe = self.connector.connect(None).await?;
        if let Err(e) = probe.close().await {
            warn!("Failed to close server connection: {e}");
        }

        let mut report = RunReport::default();
        for database in databases {
            report
                .databases
                .push(self.run_database(database, out).await);
        }
        Ok(report)
    }

    /// Process one database: connect, list tables, load the job, run each
    /// table in job order, close.
    pub async fn run_database<W: Write + ?Sized>(&self, database: &str, out: &mut W) -> DatabaseReport {
        info!("Processing database {database}");

        let mut session = match self.connector.connect(Some(database)).await {
            Ok(session) => session,
            Err(e) => return DatabaseReport::skipped(database, e),
        };

        let result = async {
            let live_tables = session.table_names().await?;
            let jobs = self
                .provider
                .job_config(&self.server, database)?
                .jobs(self.settings.min_records)?;
            Ok::<_, FillError>((live_tables, jobs))
        }
        .await;

        let report = match result {
            Ok((live_tables, jobs)) => {
                let mut tables = Vec::with_capacity(jobs.len());
                for job in &jobs {
                    let table_report = run_table(
                        session.as_mut(),
                        database,
                        job,
                        &live_tables,
                        self.settings,
                        out,
                    )
                    .await;
                    tables.push(table_report);
                }
                DatabaseReport {
                    database: database.to_string(),
                    error: None,
                    tables,
                }
            }
            Err(e) => DatabaseReport::skipped(database, e),
        };

        if let Err(e) = session.close().await {
            warn!("Failed to close connection to {database}: {e}");
        }
        report
    }
}
