//! Configuration provider backed by values instead of files.

use crate::config::{ConfigError, ConfigProvider, ConnectionConfig, JobConfig};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    connection: ConnectionConfig,
    jobs: HashMap<(String, String), JobConfig>,
}

impl StaticConfigProvider {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            jobs: HashMap::new(),
        }
    }

    pub fn with_job(mut self, server: &str, database: &str, job: JobConfig) -> Self {
        self.jobs
            .insert((server.to_string(), database.to_string()), job);
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        Ok(self.connection.clone())
    }

    fn job_config(&self, server: &str, database: &str) -> Result<JobConfig, ConfigError> {
        self.jobs
            .get(&(server.to_string(), database.to_string()))
            .cloned()
            .ok_or_else(|| ConfigError::MissingJob {
                server: server.to_string(),
                database: database.to_string(),
            })
    }

    fn has_job_config(&self, server: &str, database: &str) -> bool {
        self.jobs
            .contains_key(&(server.to_string(), database.to_string()))
    }
}
