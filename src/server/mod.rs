//! HTTP conversion service

mod handlers;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::{client_id, ConvertRequest, ConvertResponse, HealthResponse};

use crate::config::ServiceConfig;
use crate::correction::LlmCorrector;
use crate::gate::ConcurrencyGate;

/// Shared server state
pub struct AppState {
    pub gate: Arc<ConcurrencyGate>,
    pub corrector: Option<LlmCorrector>,
    /// Result of the startup probe; corrections are skipped when false
    pub ai_available: bool,
}

impl AppState {
    /// Conversion only, no LLM
    pub fn new(gate: Arc<ConcurrencyGate>) -> Self {
        Self {
            gate,
            corrector: None,
            ai_available: false,
        }
    }

    pub fn with_corrector(mut self, corrector: LlmCorrector, available: bool) -> Self {
        self.corrector = Some(corrector);
        self.ai_available = available;
        self
    }

    /// Corrector to use for requests, if configured and reachable
    pub fn corrector(&self) -> Option<&LlmCorrector> {
        self.corrector.as_ref().filter(|_| self.ai_available)
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::root_status_handler).post(handlers::convert_handler),
        )
        .route("/api/convert", post(handlers::convert_handler))
        .route("/convert", post(handlers::convert_handler))
        .route("/health", get(handlers::health_handler))
        .layer(cors_layer())
        .with_state(state)
}

/// Build state from config, probing the LLM if one is configured
pub async fn build_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    let gate = Arc::new(ConcurrencyGate::new(config.gate_config()));
    let state = AppState::new(gate);

    let Some(llm) = config.llm.clone() else {
        log::info!("no LLM configured, serving layout conversion only");
        return Ok(state);
    };

    let corrector = LlmCorrector::new(llm)?;
    let available = corrector.probe().await;
    log::info!(
        "LLM correction via {} ({}): available = {}",
        corrector.config().endpoint,
        corrector.config().model,
        available
    );
    Ok(state.with_corrector(corrector, available))
}

/// Run the server until Ctrl+C
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    config.validate()?;

    let state = Arc::new(build_state(&config).await?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    log::info!(
        "listening on {} (max {} concurrent, {} per client per {}s)",
        config.listen_addr,
        config.max_concurrent_calls,
        config.max_calls_per_minute,
        config.rate_window_secs
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
    .await?;

    Ok(())
}

/// Resolve once `signal` fires. If the handler could not be installed,
/// never resolve, so the server keeps running instead of exiting at once.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => log::info!("shutting down"),
        Err(e) => {
            log::error!("failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        let done = tokio::time::timeout(Duration::from_millis(100), shutdown_on(async { Ok(()) })).await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_handler_keeps_running() {
        let failed = async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) };
        let done = tokio::time::timeout(Duration::from_millis(100), shutdown_on(failed)).await;
        assert!(done.is_err());
    }
}
