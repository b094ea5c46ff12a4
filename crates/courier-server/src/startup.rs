//! Server startup utilities.

use courier_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
   ______                _
  / ____/___  __  _______(_)__  _____
 / /   / __ \/ / / / ___/ / _ \/ ___/
/ /___/ /_/ / /_/ / /  / /  __/ /
\____/\____/\__,_/_/  /_/\___/_/

            Email Queue
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Send:      POST http://{}/send-email", addr);
    info!("Dead:      GET  http://{}/dead-letter", addr);
    info!("Health:    http://{}/health", addr);
    info!("Metrics:   http://{}/metrics", addr);
    info!("API Docs:  http://{}/api-docs/openapi.json", addr);
    info!(
        "Workers:   {} (queue size {}, retry queue size {})",
        config.jobs.workers,
        config.jobs.queue_size,
        config.jobs.retry_queue_size()
    );
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }
}
