//! Application configuration structures.

use courier_core::telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Job engine configuration.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "email-queue".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Enable permissive CORS.
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cors_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            cors_enabled: default_cors_enabled(),
        }
    }
}

impl ServerConfig {
    /// Returns the HTTP bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Job engine configuration.
///
/// Read once when the engine is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Number of concurrent workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the primary queue. The retry queue holds half of it.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Maximum number of retries before a job is dead-lettered.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step in milliseconds (nth retry waits n steps).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Simulated delivery duration in milliseconds.
    #[serde(default = "default_delivery_latency")]
    pub delivery_latency_ms: u64,

    /// Queue depth sampling interval in milliseconds.
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_ms: u64,

    /// Upper bound on the graceful drain, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_workers() -> usize {
    3
}

fn default_queue_size() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    1000
}

fn default_delivery_latency() -> u64 {
    1000
}

fn default_monitor_interval() -> u64 {
    1000
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_size: default_queue_size(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            delivery_latency_ms: default_delivery_latency(),
            monitor_interval_ms: default_monitor_interval(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl JobsConfig {
    /// Returns the retry-queue capacity: half the primary queue, at least one.
    #[must_use]
    pub const fn retry_queue_size(&self) -> usize {
        let half = self.queue_size / 2;
        if half == 0 {
            1
        } else {
            half
        }
    }

    /// Returns the retry backoff step as Duration.
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Returns the simulated delivery latency as Duration.
    #[must_use]
    pub const fn delivery_latency(&self) -> Duration {
        Duration::from_millis(self.delivery_latency_ms)
    }

    /// Returns the queue depth sampling interval as Duration.
    #[must_use]
    pub const fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    /// Returns the shutdown timeout as Duration.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_defaults_match_legacy_service() {
        let jobs = JobsConfig::default();
        assert_eq!(jobs.workers, 3);
        assert_eq!(jobs.queue_size, 100);
        assert_eq!(jobs.max_retries, 3);
        assert_eq!(jobs.retry_backoff(), Duration::from_secs(1));
        assert_eq!(jobs.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_queue_size_is_half_rounded_down() {
        let mut jobs = JobsConfig::default();
        assert_eq!(jobs.retry_queue_size(), 50);

        jobs.queue_size = 7;
        assert_eq!(jobs.retry_queue_size(), 3);
    }

    #[test]
    fn test_retry_queue_size_has_minimum_of_one() {
        let jobs = JobsConfig {
            queue_size: 1,
            ..JobsConfig::default()
        };
        assert_eq!(jobs.retry_queue_size(), 1);
    }

    #[test]
    fn test_server_address() {
        let server = ServerConfig::default();
        assert_eq!(server.addr(), "0.0.0.0:8080");
        assert_eq!(server.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [jobs]
            workers = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.jobs.workers, 8);
        assert_eq!(config.jobs.queue_size, 100);
        assert_eq!(config.server.port, 8080);
    }
}
