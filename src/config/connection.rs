//! Connection file: named servers and their known databases.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Default MySQL port when a server entry omits one.
pub const DEFAULT_PORT: u16 = 3306;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Database engine of a server entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Mysql,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Mysql => write!(f, "mysql"),
        }
    }
}

/// One named server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub user: String,

    pub engine: Engine,

    /// Databases processed when none are given on the command line
    #[serde(default)]
    pub dbnames: Vec<String>,
}

/// Contents of the connection file.
///
/// ```yaml
/// servers:
///   local:
///     host: 127.0.0.1
///     port: 3306
///     user: root
///     engine: mysql
///     dbnames: [shop, hr]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerEntry>,
}

impl ConnectionConfig {
    /// Load the connection file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse connection YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Result<&ServerEntry, ConfigError> {
        self.servers
            .get(name)
            .ok_or_else(|| ConfigError::UnknownServer(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
servers:
  local:
    host: 127.0.0.1
    port: 3307
    user: root
    engine: mysql
    dbnames: [shop, hr]
  reporting:
    host: reports.internal
    user: reader
    engine: mysql
"#;

    #[test]
    fn test_parse_connection_file() {
        let config = ConnectionConfig::from_yaml(YAML).unwrap();

        let local = config.server("local").unwrap();
        assert_eq!(local.host, "127.0.0.1");
        assert_eq!(local.port, 3307);
        assert_eq!(local.engine, Engine::Mysql);
        assert_eq!(local.dbnames, vec!["shop", "hr"]);

        let reporting = config.server("reporting").unwrap();
        assert_eq!(reporting.port, DEFAULT_PORT);
        assert!(reporting.dbnames.is_empty());
    }

    #[test]
    fn test_unknown_server() {
        let config = ConnectionConfig::from_yaml(YAML).unwrap();
        let err = config.server("prod").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownServer(ref s) if s == "prod"));
    }

    #[test]
    fn test_unknown_engine_is_rejected() {
        let yaml = r#"
servers:
  pg:
    host: localhost
    user: postgres
    engine: postgresql
"#;
        assert!(matches!(
            ConnectionConfig::from_yaml(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }
}
