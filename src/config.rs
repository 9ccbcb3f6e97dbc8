use crate::models::NetworkInfo;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Responses between two folds of the batch average.
    #[serde(default = "default_max_size_for_persistence")]
    pub max_size_for_persistence: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_size_for_persistence: default_max_size_for_persistence(),
        }
    }
}

fn default_max_size_for_persistence() -> u32 {
    crate::aggregator::DEFAULT_MAX_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "data/netstats.db".into()
}

/// Network the binary reports as active. No `type_name` means disconnected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    pub type_name: Option<String>,
    pub subtype_name: Option<String>,
    pub ssid: Option<String>,
}

impl NetworkConfig {
    pub fn network_info(&self) -> Option<NetworkInfo> {
        self.type_name.as_ref().map(|type_name| NetworkInfo {
            type_name: Some(type_name.clone()),
            subtype_name: self.subtype_name.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".into()
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `netstats.toml`). A missing default file
    /// yields the built-in defaults; an explicit path must exist.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string("netstats.toml") {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.stats.max_size_for_persistence > 0,
            "stats.max_size_for_persistence must be > 0, got {}",
            self.stats.max_size_for_persistence
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.network.type_name.as_deref().is_none_or(|t| !t.is_empty()),
            "network.type_name must be non-empty when set"
        );
        anyhow::ensure!(
            !self.logging.filter.is_empty(),
            "logging.filter must be non-empty"
        );
        Ok(())
    }
}
