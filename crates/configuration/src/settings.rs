use crate::error::ConfigError;
use core_types::Period;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty `config.toml` (or none at all)
/// yields a working setup without a database cache.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub analysis: AnalysisSettings,
    pub data_source: DataSourceSettings,
    /// When absent, price history is always fetched from the data source.
    pub database: Option<DatabaseSettings>,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Rejects values that deserialize fine but make no sense at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.analysis.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "analysis.risk_free_rate must be finite, got {}",
                self.analysis.risk_free_rate
            )));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.data_source.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "data_source.base_url must not be empty".to_string(),
            ));
        }
        if self.data_source.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "data_source.timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(db) = &self.database {
            if db.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "database.url must not be empty".to_string(),
                ));
            }
            if db.max_connections == 0 {
                return Err(ConfigError::ValidationError(
                    "database.max_connections must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Where the HTTP service listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Defaults applied when a request leaves them out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Annual risk-free rate as a fraction (0.02 is 2%).
    pub risk_free_rate: f64,
    pub default_period: Period,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            default_period: Period::TwoYears,
        }
    }
}

/// The upstream daily-price provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSourceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Scale OHLC by the adjusted close so splits and dividends don't show up as jumps.
    pub auto_adjust: bool,
}

impl Default for DataSourceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (compatible; finagent/0.1)".to_string(),
            auto_adjust: true,
        }
    }
}

/// Postgres read-through cache for downloaded price history.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a cached download of a range is reused before refetching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    12 * 60 * 60
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info` or `analytics=debug`.
    pub level: String,
    /// If set, logs are also written to a daily-rotated file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
