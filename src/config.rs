//! Data source configuration.
//!
//! The data source is described by the classic `jdbc.*` keys in a `key=value`
//! properties file, plus optional `pool.*` keys for sizing the pool.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EntityAccessError;
use crate::types::Driver;

pub const KEY_DRIVER: &str = "jdbc.driver";
pub const KEY_URL: &str = "jdbc.url";
pub const KEY_USERNAME: &str = "jdbc.username";
pub const KEY_PASSWORD: &str = "jdbc.password";

pub const KEY_POOL_MAX_SIZE: &str = "pool.max_size";
pub const KEY_POOL_MIN_IDLE: &str = "pool.min_idle";
pub const KEY_POOL_ACQUIRE_TIMEOUT_MS: &str = "pool.acquire_timeout_ms";
pub const KEY_POOL_BUSY_TIMEOUT_MS: &str = "pool.busy_timeout_ms";

pub const DEFAULT_MAX_SIZE: u32 = 8;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const URL_PREFIXES: [&str; 2] = ["jdbc:sqlite:", "sqlite:"];

/// Pool sizing and timeout options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Upper bound on open connections.
    pub max_size: u32,
    /// Idle connections the pool keeps warm, if any.
    pub min_idle: Option<u32>,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout_ms: u64,
    /// `SQLite` busy timeout applied to every new connection.
    pub busy_timeout_ms: u64,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            min_idle: None,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl PoolOptions {
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Check the options for values the pool cannot honor.
    ///
    /// # Errors
    /// Returns `EntityAccessError::Config` describing the first invalid option.
    pub fn validate(&self) -> Result<(), EntityAccessError> {
        if self.max_size == 0 {
            return Err(EntityAccessError::Config(format!(
                "{KEY_POOL_MAX_SIZE} must be greater than 0"
            )));
        }
        if let Some(min) = self.min_idle {
            if min > self.max_size {
                return Err(EntityAccessError::Config(format!(
                    "{KEY_POOL_MIN_IDLE} ({min}) cannot exceed {KEY_POOL_MAX_SIZE} ({})",
                    self.max_size
                )));
            }
        }
        if self.acquire_timeout_ms == 0 {
            return Err(EntityAccessError::Config(format!(
                "{KEY_POOL_ACQUIRE_TIMEOUT_MS} must be greater than 0"
            )));
        }
        Ok(())
    }
}

/// Connection settings for the backing database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub driver: Driver,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub pool: PoolOptions,
}

// Keep the password out of logs.
impl fmt::Debug for DataSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceConfig")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pool", &self.pool)
            .finish()
    }
}

impl DataSourceConfig {
    #[must_use]
    pub fn new(driver: Driver, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            username: None,
            password: None,
            pool: PoolOptions::default(),
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_pool(mut self, pool: PoolOptions) -> Self {
        self.pool = pool;
        self
    }

    /// Load settings from a properties file on disk.
    ///
    /// # Errors
    /// Returns `EntityAccessError::Config` if the file cannot be read or a
    /// required key is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EntityAccessError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EntityAccessError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_properties(&text)
    }

    /// Parse settings from properties text.
    ///
    /// # Errors
    /// Returns `EntityAccessError::Config` if a required key is missing, the
    /// driver is unknown, or a pool option is not a valid number.
    pub fn from_properties(text: &str) -> Result<Self, EntityAccessError> {
        let props = parse_properties(text);

        let driver_name = required(&props, KEY_DRIVER)?;
        let driver = Driver::parse(driver_name).ok_or_else(|| {
            EntityAccessError::Config(format!("unsupported {KEY_DRIVER}: {driver_name}"))
        })?;
        let url = required(&props, KEY_URL)?.to_owned();

        let defaults = PoolOptions::default();
        let pool = PoolOptions {
            max_size: numeric(&props, KEY_POOL_MAX_SIZE)?.unwrap_or(defaults.max_size),
            min_idle: numeric(&props, KEY_POOL_MIN_IDLE)?,
            acquire_timeout_ms: numeric(&props, KEY_POOL_ACQUIRE_TIMEOUT_MS)?
                .unwrap_or(defaults.acquire_timeout_ms),
            busy_timeout_ms: numeric(&props, KEY_POOL_BUSY_TIMEOUT_MS)?
                .unwrap_or(defaults.busy_timeout_ms),
        };
        pool.validate()?;

        Ok(Self {
            driver,
            url,
            username: props.get(KEY_USERNAME).cloned(),
            password: props.get(KEY_PASSWORD).cloned(),
            pool,
        })
    }

    /// The database location with any `jdbc:sqlite:` / `sqlite:` prefix removed.
    #[must_use]
    pub fn database_path(&self) -> &str {
        URL_PREFIXES
            .iter()
            .find_map(|prefix| self.url.strip_prefix(prefix))
            .unwrap_or(&self.url)
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        let path = self.database_path();
        path == ":memory:" || path.contains("mode=memory")
    }
}

fn parse_properties(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(&['=', ':'][..])?;
            let (key, value) = line.split_at(split);
            Some((key.trim().to_owned(), value[1..].trim().to_owned()))
        })
        .collect()
}

fn required<'a>(
    props: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a str, EntityAccessError> {
    props
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EntityAccessError::Config(format!("missing required key {key}")))
}

fn numeric<T: std::str::FromStr>(
    props: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, EntityAccessError> {
    props
        .get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| EntityAccessError::Config(format!("{key} is not a number: {raw}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
# data source
jdbc.driver=org.sqlite.JDBC
jdbc.url=jdbc:sqlite:/tmp/demo.db
jdbc.username = root
jdbc.password = secret
pool.max_size=2
";

    #[test]
    fn parses_jdbc_keys_and_pool_options() {
        let cfg = DataSourceConfig::from_properties(SAMPLE).unwrap();
        assert_eq!(cfg.driver, Driver::Sqlite);
        assert_eq!(cfg.database_path(), "/tmp/demo.db");
        assert_eq!(cfg.username.as_deref(), Some("root"));
        assert_eq!(cfg.password.as_deref(), Some("secret"));
        assert_eq!(cfg.pool.max_size, 2);
        assert_eq!(cfg.pool.acquire_timeout_ms, DEFAULT_ACQUIRE_TIMEOUT_MS);
    }

    #[test]
    fn debug_output_redacts_password() {
        let cfg = DataSourceConfig::from_properties(SAMPLE).unwrap();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = DataSourceConfig::from_properties("jdbc.driver=sqlite").unwrap_err();
        assert!(matches!(err, EntityAccessError::Config(msg) if msg.contains(KEY_URL)));
    }

    #[test]
    fn unknown_driver_is_rejected() {
        let err = DataSourceConfig::from_properties(
            "jdbc.driver=com.mysql.jdbc.Driver\njdbc.url=jdbc:mysql://localhost/demo",
        )
        .unwrap_err();
        assert!(matches!(err, EntityAccessError::Config(_)));
    }

    #[test]
    fn min_idle_above_max_size_is_rejected() {
        let err = DataSourceConfig::from_properties(
            "jdbc.driver=sqlite\njdbc.url=:memory:\npool.max_size=1\npool.min_idle=3",
        )
        .unwrap_err();
        assert!(matches!(err, EntityAccessError::Config(msg) if msg.contains(KEY_POOL_MIN_IDLE)));
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(DataSourceConfig::new(Driver::Sqlite, "sqlite::memory:").is_in_memory());
        assert!(
            DataSourceConfig::new(Driver::Sqlite, "file:shared?mode=memory&cache=shared")
                .is_in_memory()
        );
        assert!(!DataSourceConfig::new(Driver::Sqlite, "/var/db/app.db").is_in_memory());
    }
}
