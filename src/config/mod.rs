use std::env;
use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

/// Application configuration: PostgreSQL connection details and the
/// statement export layout. Values load from an optional TOML file;
/// PG_* environment variables override the database section, which is how
/// deployment credentials are supplied.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) database: DatabaseConfig,
    #[serde(default)]
    pub(crate) statement: StatementConfig,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct DatabaseConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) dbname: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) sslmode: String,
}

impl Default for DatabaseConfig {
    fn default() -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "postgres".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            sslmode: "require".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct StatementConfig {
    /// Number of preamble rows before the header row.
    pub(crate) skip_rows: usize,
}

impl Default for StatementConfig {
    fn default() -> StatementConfig {
        StatementConfig { skip_rows: 2 }
    }
}

impl Config {
    pub(crate) fn load(file_path: &str) -> anyhow::Result<Config> {
        let path = Path::new(file_path);
        let mut config = if path.exists() && path.is_file() {
            toml::from_str::<Config>(&fs::read_to_string(path)?)?
        } else {
            Config::default()
        };
        config.database.apply_env_overrides();
        Ok(config)
    }
}

impl DatabaseConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("PG_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("PG_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring non-numeric PG_PORT {port:?}"),
            }
        }
        if let Ok(dbname) = env::var("PG_DB") {
            self.dbname = dbname;
        }
        if let Ok(user) = env::var("PG_USER") {
            self.user = user;
        }
        if let Ok(password) = env::var("PG_PASSWORD") {
            self.password = password;
        }
        if let Ok(sslmode) = env::var("PG_SSLMODE") {
            self.sslmode = sslmode;
        }
    }
}
