//! Application wiring.

use crate::signal::shutdown_signal;
use axum::Router;
use courier_config::AppConfig;
use courier_core::{CourierError, CourierResult};
use courier_jobs::{EmailService, PrometheusMetrics, ServiceConfig, SimulatedMailer};
use courier_rest::{create_router, AppState};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// The assembled server: engine, metrics and HTTP router.
pub struct Application {
    config: AppConfig,
    service: Arc<EmailService>,
    metrics: Arc<PrometheusMetrics>,
    router: Router,
}

/// How the engine drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every engine task exited.
    Completed,
    /// The engine was not running or already stopped.
    Skipped,
    /// The shutdown timeout elapsed first.
    TimedOut,
}

impl Application {
    /// Builds every component from configuration. Nothing runs yet.
    pub fn build(config: AppConfig) -> Self {
        let metrics = Arc::new(PrometheusMetrics::new());
        let mailer = Arc::new(SimulatedMailer::new(config.jobs.delivery_latency()));
        let service = Arc::new(EmailService::new(
            ServiceConfig::from(&config.jobs),
            mailer,
            metrics.clone(),
        ));
        let router = create_router(
            AppState::new(service.clone(), metrics.clone()),
            &config.server,
        );

        Self {
            config,
            service,
            metrics,
            router,
        }
    }

    /// The job engine.
    pub fn service(&self) -> &Arc<EmailService> {
        &self.service
    }

    /// The metrics registry behind `/metrics`.
    pub fn metrics(&self) -> &Arc<PrometheusMetrics> {
        &self.metrics
    }

    /// A handle to the HTTP router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Binds the configured address and serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> CourierResult<()> {
        let addr = self.config.server.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| CourierError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Starts the engine, serves HTTP until `shutdown` completes, then drains
    /// the engine within the configured timeout.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> CourierResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            config,
            service,
            router,
            ..
        } = self;

        service.start()?;

        if let Ok(addr) = listener.local_addr() {
            info!("Starting HTTP server on http://{}", addr);
        }

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await;

        drain(&service, &config).await;

        served.map_err(|e| CourierError::Internal(format!("HTTP server error: {}", e)))
    }
}

/// Shuts the engine down, giving up after `jobs.shutdown_timeout_secs`.
pub async fn drain(service: &EmailService, config: &AppConfig) -> DrainOutcome {
    let timeout = config.jobs.shutdown_timeout();

    match tokio::time::timeout(timeout, service.shutdown()).await {
        Ok(Ok(())) => {
            info!("Email service drained");
            DrainOutcome::Completed
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Email service was not running");
            DrainOutcome::Skipped
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "Email service did not drain before the timeout"
            );
            DrainOutcome::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use courier_jobs::{EmailJob, ServiceState};
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.jobs.workers = 2;
        config.jobs.queue_size = 4;
        config.jobs.delivery_latency_ms = 10;
        config.jobs.shutdown_timeout_secs = 5;
        config
    }

    #[test]
    fn test_build_uses_job_settings() {
        let app = Application::build(test_config());
        let stats = app.service().stats();

        assert_eq!(stats.state, ServiceState::Constructed);
        assert_eq!(stats.workers, 2);
        assert_eq!(stats.queue_capacity, 4);
        assert_eq!(stats.retry_queue_capacity, 2);
    }

    #[tokio::test]
    async fn test_router_is_wired_to_service() {
        let app = Application::build(test_config());

        let response = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.metrics().render().contains("email_jobs_processed_total"));
    }

    #[tokio::test]
    async fn test_serve_drains_engine_on_shutdown() {
        let app = Application::build(test_config());
        let service = app.service().clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        app.serve(listener, async {}).await.unwrap();

        assert_eq!(service.state(), ServiceState::Stopped);
        assert!(service.enqueue(EmailJob::new("a@b.com", "Hi", "x")).is_err());
    }

    #[tokio::test]
    async fn test_drain_twice_is_skipped() {
        let config = test_config();
        let app = Application::build(config.clone());
        app.service().start().unwrap();

        assert_eq!(drain(app.service(), &config).await, DrainOutcome::Completed);
        assert_eq!(drain(app.service(), &config).await, DrainOutcome::Skipped);
    }
}
