//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use courier_core::CourierError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Flat environment variables honoured for compatibility with earlier
/// deployments. They take precedence over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyEnv {
    /// `WORKERS`
    pub workers: Option<i64>,
    /// `QUEUE_SIZE`
    pub queue_size: Option<i64>,
    /// `PORT`
    pub port: Option<i64>,
}

impl LegacyEnv {
    /// Reads `WORKERS`, `QUEUE_SIZE` and `PORT` from the process environment.
    ///
    /// Unparseable values are ignored so the next source wins.
    pub fn from_env() -> Self {
        Self {
            workers: parse_var("WORKERS"),
            queue_size: parse_var("QUEUE_SIZE"),
            port: parse_var("PORT"),
        }
    }
}

fn parse_var(key: &str) -> Option<i64> {
    let raw = std::env::var(key).ok().filter(|v| !v.is_empty())?;
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}

/// Configuration loader with layered sources.
///
/// Configuration is read once at startup; the job engine keeps the settings
/// it was built with.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from `config_dir`.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `COURIER__` prefix (`COURIER__JOBS__WORKERS=8`)
    /// 5. Flat `WORKERS`, `QUEUE_SIZE` and `PORT` variables
    pub fn load(config_dir: &str) -> Result<AppConfig, CourierError> {
        Self::load_config(config_dir)
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<AppConfig, CourierError> {
        Self::load("./config")
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, CourierError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("COURIER_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Self::build(config_dir, &environment, &LegacyEnv::from_env())
    }

    /// Builds and validates configuration from explicit inputs.
    pub fn build(
        config_dir: &str,
        environment: &str,
        legacy: &LegacyEnv,
    ) -> Result<AppConfig, CourierError> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment, "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::from(Path::new(&path)).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("COURIER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option("jobs.workers", legacy.workers)
            .and_then(|b| b.set_override_option("jobs.queue_size", legacy.queue_size))
            .and_then(|b| b.set_override_option("server.port", legacy.port))
            .map_err(config_error_to_courier_error)?;

        let config = builder.build().map_err(config_error_to_courier_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_courier_error)?;

        ConfigValidator::validate(&app_config).map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            CourierError::Configuration(message)
        })?;

        Ok(app_config)
    }
}

fn config_error_to_courier_error(err: ConfigError) -> CourierError {
    CourierError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::build(
            dir.path().to_str().unwrap(),
            "development",
            &LegacyEnv::default(),
        )
        .unwrap();

        assert_eq!(config.jobs.workers, 3);
        assert_eq!(config.jobs.queue_size, 100);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[jobs]\nworkers = 2\nqueue_size = 10\n",
        )
        .unwrap();
        fs::write(dir.path().join("staging.toml"), "[jobs]\nworkers = 6\n").unwrap();

        let config =
            ConfigLoader::build(dir.path().to_str().unwrap(), "staging", &LegacyEnv::default())
                .unwrap();

        assert_eq!(config.jobs.workers, 6);
        assert_eq!(config.jobs.queue_size, 10);
    }

    #[test]
    fn test_legacy_variables_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[jobs]\nworkers = 2\n[server]\nport = 9000\n",
        )
        .unwrap();

        let legacy = LegacyEnv {
            workers: Some(5),
            queue_size: Some(40),
            port: Some(3000),
        };
        let config =
            ConfigLoader::build(dir.path().to_str().unwrap(), "development", &legacy).unwrap();

        assert_eq!(config.jobs.workers, 5);
        assert_eq!(config.jobs.queue_size, 40);
        assert_eq!(config.jobs.retry_queue_size(), 20);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = LegacyEnv {
            workers: Some(0),
            ..LegacyEnv::default()
        };

        let err = ConfigLoader::build(dir.path().to_str().unwrap(), "development", &legacy)
            .unwrap_err();
        assert!(matches!(err, CourierError::Configuration(msg) if msg.contains("jobs.workers")));
    }

    #[test]
    fn test_loader_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.toml"), "[server]\nhost = \"127.0.0.1\"\n").unwrap();

        let config = ConfigLoader::load(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
