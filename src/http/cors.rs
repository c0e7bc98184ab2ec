//! Cross-origin handling.
//!
//! Preflight requests are answered before routing, on every path. API
//! responses get a permissive `Access-Control-Allow-Origin`; passthrough
//! responses are left as the static origin sent them.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const MAX_AGE_SECS: &str = "86400";

/// Fixed answer to an `OPTIONS` request.
pub fn preflight_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, MAX_AGE_SECS),
        ],
    )
        .into_response()
}

/// Short-circuits `OPTIONS` before any route or passthrough runs.
pub async fn preflight_middleware(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        tracing::debug!(path = %req.uri().path(), "Answering CORS preflight");
        return preflight_response();
    }
    next.run(req).await
}

/// Adds `Access-Control-Allow-Origin: *` to every response of the wrapped routes.
pub fn allow_origin_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_headers() {
        let response = preflight_response();
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
        assert!(headers.get(header::CONTENT_TYPE).is_none());
    }
}
