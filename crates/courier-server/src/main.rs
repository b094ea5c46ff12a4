//! # Courier Server
//!
//! Main entry point for the Courier email queue service.

use courier_config::ConfigLoader;
use courier_core::telemetry::{init_logging, LoggingConfig};
use courier_server::{startup, Application};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging(&LoggingConfig::default());
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    startup::print_banner();
    info!("Starting Courier email queue...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);
    startup::print_startup_info(&config);

    if let Err(e) = Application::build(config).run().await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }

    info!("Server exited");
}
