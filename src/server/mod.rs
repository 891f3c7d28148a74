//! HTTP API.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /api/chat/thread`
//! - `POST /api/chat/message`
//! - `GET  /api/tools`
//! - `POST /api/tools/:name/execute`
//!
//! Every route is rate limited per client IP, accepts bodies up to 10 MB and
//! carries the security headers in [`middleware::SECURITY_HEADERS`].

pub mod error;
pub mod handlers;
pub mod middleware;

use crate::assistant::{Sleeper, TokioSleeper};
use crate::chat::PollSettings;
use crate::config::AgentConfig;
use crate::openai::AssistantsApi;
use crate::state::SharedDatabase;
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use middleware::{RateLimiter, BODY_LIMIT_BYTES, SECURITY_HEADERS};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

pub struct AppState {
    pub api: Arc<dyn AssistantsApi>,
    pub registry: Arc<ToolRegistry>,
    pub assistant_id: String,
    pub db: SharedDatabase,
    pub poll: PollSettings,
    pub sleeper: Arc<dyn Sleeper>,
    pub limiter: Arc<RateLimiter>,
    /// Include error details in 500 responses.
    pub development: bool,
}

impl AppState {
    pub fn new(
        config: &AgentConfig,
        api: Arc<dyn AssistantsApi>,
        registry: Arc<ToolRegistry>,
        assistant_id: impl Into<String>,
        db: SharedDatabase,
    ) -> Self {
        Self {
            api,
            registry,
            assistant_id: assistant_id.into(),
            db,
            poll: PollSettings::from_config(config),
            sleeper: Arc::new(TokioSleeper),
            limiter: Arc::new(RateLimiter::from_config(config)),
            development: config.is_development(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/chat/thread", post(handlers::create_thread))
        .route("/api/chat/message", post(handlers::post_message))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/:name/execute", post(handlers::execute_tool))
        .fallback(error::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.limiter.clone(),
            middleware::rate_limit,
        ));

    for &(name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    app.layer(cors_layer(allowed_origins)).with_state(state)
}

/// Credentialed CORS for an explicit origin list.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Serve until `cancel` fires.
pub async fn serve(
    state: Arc<AppState>,
    port: u16,
    allowed_origins: &[String],
    cancel: CancellationToken,
) -> Result<()> {
    let app = router(state, allowed_origins);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("HTTP server error")?;
    info!("HTTP server stopped");
    Ok(())
}
