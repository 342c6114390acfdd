//! Configuration: the connection file, per-database job files and the
//! provider seam the runner reads them through.

pub mod connection;
pub mod job;

pub use connection::{ConnectionConfig, Engine, ServerEntry, DEFAULT_PORT};
pub use job::{parse_table_counts, Command, JobConfig, DEFAULT_MIN_RECORDS};

use fill_core::FillError;
use std::path::{Path, PathBuf};

/// Errors raised while loading or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown server '{0}'")]
    UnknownServer(String),

    #[error("No databases given and server '{0}' lists no dbnames")]
    NoDatabases(String),

    #[error("No job file for database '{database}' on server '{server}'")]
    MissingJob { server: String, database: String },

    #[error("Job file lists no tables")]
    NoTables,
}

impl From<ConfigError> for FillError {
    fn from(err: ConfigError) -> Self {
        FillError::Config(err.to_string())
    }
}

/// Source of connection and job configuration.
pub trait ConfigProvider {
    fn connection_config(&self) -> Result<ConnectionConfig, ConfigError>;

    fn job_config(&self, server: &str, database: &str) -> Result<JobConfig, ConfigError>;

    fn has_job_config(&self, server: &str, database: &str) -> bool;
}

/// Reads YAML files: one connection file plus
/// `<config_dir>/<server>/<database>.yaml` per database.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    connection_file: PathBuf,
    config_dir: PathBuf,
}

impl FileConfigProvider {
    pub fn new(connection_file: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            connection_file: connection_file.into(),
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the job file for one database.
    pub fn job_path(&self, server: &str, database: &str) -> PathBuf {
        self.config_dir.join(server).join(format!("{database}.yaml"))
    }

    /// Write a job file, creating the server directory if needed.
    pub fn write_job_config(
        &self,
        server: &str,
        database: &str,
        job: &JobConfig,
    ) -> Result<PathBuf, ConfigError> {
        let path = self.job_path(server, database);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, job.to_yaml()?).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl ConfigProvider for FileConfigProvider {
    fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        ConnectionConfig::from_file(&self.connection_file)
    }

    fn job_config(&self, server: &str, database: &str) -> Result<JobConfig, ConfigError> {
        let path = self.job_path(server, database);
        if !path.is_file() {
            return Err(ConfigError::MissingJob {
                server: server.to_string(),
                database: database.to_string(),
            });
        }
        JobConfig::from_file(path)
    }

    fn has_job_config(&self, server: &str, database: &str) -> bool {
        self.job_path(server, database).is_file()
    }
}
