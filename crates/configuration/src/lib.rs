use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalysisSettings, DataSourceSettings, DatabaseSettings, LoggingSettings, ServerSettings,
    Settings,
};

/// Prefix for environment overrides, e.g. `FINAGENT__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "FINAGENT";
const ENV_SEPARATOR: &str = "__";

/// Loads the application configuration.
///
/// This function is the primary entry point for this crate. Built-in defaults
/// are overlaid by the TOML file at `path` (skipped if it does not exist) and
/// then by `FINAGENT__*` environment variables. The merged result is validated
/// before it is returned.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Loads settings from TOML text alone, without touching the filesystem or environment.
pub fn load_config_from_str(toml: &str) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    tracing::debug!(
        port = settings.server.port,
        cache = settings.database.is_some(),
        "Configuration loaded."
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Period;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = load_config_from_str("").unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.analysis.risk_free_rate, 0.02);
        assert_eq!(settings.analysis.default_period, Period::TwoYears);
        assert!(settings.data_source.auto_adjust);
        assert!(settings.database.is_none());
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
            [server]
            port = 9100

            [analysis]
            risk_free_rate = 0.045
            default_period = "5y"

            [database]
            url = "postgres://localhost/finagent"
        "#;
        let settings = load_config_from_str(toml).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.analysis.risk_free_rate, 0.045);
        assert_eq!(settings.analysis.default_period, Period::FiveYears);

        let db = settings.database.unwrap();
        assert_eq!(db.url, "postgres://localhost/finagent");
        assert_eq!(db.max_connections, 5);
        assert_eq!(db.cache_ttl_secs, 43_200);
    }

    #[test]
    fn unknown_period_is_rejected() {
        let result = load_config_from_str("[analysis]\ndefault_period = \"3w\"\n");
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let result = load_config_from_str("[data_source]\ntimeout_secs = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = load_config(Path::new("definitely-not-here/finagent.toml")).unwrap();
        assert_eq!(settings.analysis.default_period, Period::TwoYears);
    }
}
