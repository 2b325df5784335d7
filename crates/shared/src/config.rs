//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Bank reconciliation configuration.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Bank reconciliation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Half-width of the date window used when matching statement lines
    /// against ledger entries, in days.
    #[serde(default = "default_match_window_days")]
    pub match_window_days: u32,
}

fn default_match_window_days() -> u32 {
    7
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            match_window_days: default_match_window_days(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SALDO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(config::Config::try_deserialize)
            .unwrap()
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let cfg = parse("[database]\nurl = \"postgres://localhost/saldo\"\n");

        assert_eq!(cfg.database.url, "postgres://localhost/saldo");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.min_connections, 1);
        assert_eq!(cfg.reconciliation.match_window_days, 7);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = parse(
            "[database]\n\
             url = \"postgres://db/saldo\"\n\
             max_connections = 32\n\
             [reconciliation]\n\
             match_window_days = 3\n",
        );

        assert_eq!(cfg.database.max_connections, 32);
        assert_eq!(cfg.reconciliation.match_window_days, 3);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let built = config::Config::builder()
            .add_source(config::File::from_str("[database]\n", config::FileFormat::Toml))
            .build()
            .unwrap();

        assert!(built.try_deserialize::<AppConfig>().is_err());
    }
}
