//! Shared utilities for integration tests.

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use httpmock::MockServer;
use serde_json::Value;
use tower::ServiceExt;

use workflow_gateway::{GatewayConfig, HttpServer};

pub const WORKFLOW_ID: &str = "7400000000";
pub const WORKFLOW_PATH: &str = "/v1/workflow/run";
pub const TOKEN_PATH: &str = "/token";

/// Gateway configuration pointing both upstreams at `upstream`.
pub fn test_config(upstream: &MockServer, static_token: Option<&str>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.workflow.workflow_id = WORKFLOW_ID.to_string();
    config.workflow.api_url = upstream.url(WORKFLOW_PATH);
    config.workflow.access_token = static_token.map(String::from);
    config.token_service.url = upstream.url(TOKEN_PATH);
    config
}

/// Build the full application router, the same one `main.rs` serves.
pub fn build_app(config: GatewayConfig) -> Router {
    HttpServer::new(config)
        .expect("failed to build gateway")
        .into_router()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post(app: Router, uri: &str, content_type: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// The run envelope the gateway is expected to send.
pub fn run_body(mode: &str, limit: u32, page: u32, search: &str) -> Value {
    serde_json::json!({
        "workflow_id": WORKFLOW_ID,
        "parameters": {
            "LIMIT": limit,
            "Mode": mode,
            "Page_Integer": page,
            "Search_String": search
        },
        "connector_id": "1024"
    })
}
