//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (preflight, CORS origin, tracing, timeout, request ID)
//! - Build the outbound clients shared by every request
//! - Bind server to listener and stop on shutdown

use axum::{middleware, routing::any, Router};
use axum::http::uri::Authority;
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use hyper_util::client::legacy::connect::HttpConnector;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::cors;
use crate::http::handlers;
use crate::http::passthrough::{self, PassthroughClient};
use crate::http::request::{self, RequestIdLayer};
use crate::upstream::{TokenProvider, TokenSelector, WorkflowClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub workflow: WorkflowClient,
    pub passthrough: PassthroughClient,
    pub static_origin: Option<Authority>,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Build the shared clients from configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;

        let tokens = TokenSelector::new(
            config.workflow.access_token.clone(),
            TokenProvider::new(http.clone(), config.token_service.url.clone()),
        );
        let workflow = WorkflowClient::new(http, &config.workflow, tokens);

        let passthrough = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let static_origin = config.static_assets.origin.as_deref().and_then(|origin| {
            let authority = passthrough::parse_origin(origin);
            if authority.is_none() {
                tracing::warn!(origin = %origin, "Ignoring invalid static asset origin");
            }
            authority
        });

        Ok(Self {
            max_body_bytes: config.security.max_body_bytes,
            config: Arc::new(config),
            workflow,
            passthrough,
            static_origin,
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::new(config)?;
        let config = state.config.clone();
        let router = build_router(state);
        Ok(Self { router, config })
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            static_token = self.config.workflow.static_token().is_some(),
            static_origin = ?self.config.static_assets.origin,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The assembled router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let request_secs = state.config.timeouts.request_secs;

    let api = Router::new()
        .route("/api/search", any(handlers::search))
        .route("/wallpaper/search", any(handlers::search))
        .route("/api/detail", any(handlers::detail))
        .route("/wallpaper/detail", any(handlers::detail))
        .route("/api/view", any(handlers::view))
        .route("/wallpaper/view", any(handlers::view))
        .layer(cors::allow_origin_layer());

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(request_secs));

    Router::new()
        .merge(api)
        .fallback(passthrough::forward)
        .with_state(state)
        .layer(middleware::from_fn(cors::preflight_middleware))
        .layer(timeout)
        .layer(TraceLayer::new_for_http().make_span_with(request::make_span))
        .layer(RequestIdLayer::new())
}
