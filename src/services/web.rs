//! Axum-based HTTP server for the signal controller API.
//!
//! Provides REST endpoints for:
//! - GET `/api/state` - Current signal state
//! - GET `/api/indicators` - Lamp states and button color only
//! - POST `/api/wait` - Request a wait (no body)
//! - GET `/` - Web UI (serves index.html)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::traits::IndicatorOutput;
use crate::CommandSource;

use super::api::{ApiResponse, CommandResponse, IndicatorsResponse, StateResponse};
use super::shared::SharedSignalState;

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/state - Returns current signal state
async fn get_state<O: IndicatorOutput + Send + 'static>(
    State(state): State<Arc<SharedSignalState<O>>>,
) -> Json<ApiResponse<StateResponse>> {
    let signal_state = state.state();
    Json(ApiResponse::ok(StateResponse::from(&signal_state)))
}

/// GET /api/indicators - Returns only the lamps and button color
async fn get_indicators<O: IndicatorOutput + Send + 'static>(
    State(state): State<Arc<SharedSignalState<O>>>,
) -> Json<ApiResponse<IndicatorsResponse>> {
    let signal_state = state.state();
    Json(ApiResponse::ok(IndicatorsResponse::from(&signal_state.indicators)))
}

/// POST /api/wait - Request a wait
///
/// Ignored outside vehicle green; the response says which.
async fn request_wait<O: IndicatorOutput + Send + 'static>(
    State(state): State<Arc<SharedSignalState<O>>>,
) -> Json<ApiResponse<CommandResponse>> {
    let outcome = state.request_wait(CommandSource::WebApi);
    Json(ApiResponse::ok(CommandResponse::from(outcome)))
}

/// GET / - Serve the web UI
async fn index() -> impl IntoResponse {
    Html(include_str!("../../www/index.html"))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<O: IndicatorOutput + Send + 'static>(
    state: Arc<SharedSignalState<O>>,
    config: &WebServerConfig,
) -> Router {
    let mut router = Router::new()
        // API routes
        .route("/api/state", get(get_state::<O>))
        .route("/api/indicators", get(get_indicators::<O>))
        .route("/api/wait", post(request_wait::<O>))
        // Web UI
        .route("/", get(index))
        // Fallback
        .fallback(not_found)
        .with_state(state);

    // Add CORS if requested
    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server with shared state
///
/// This function blocks until the server is shut down. The ticker and any
/// other services should hold clones of the same `Arc`.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedSignalState::new(controller));
///
/// tokio::spawn(run_ticker(Arc::clone(&state)));
/// run_server_with_state(state, web_config).await?;
/// ```
pub async fn run_server_with_state<O: IndicatorOutput + Send + 'static>(
    state: Arc<SharedSignalState<O>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router).await
}
