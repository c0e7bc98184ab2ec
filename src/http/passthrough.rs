//! Static asset passthrough.
//!
//! Any request outside the API paths is forwarded unchanged to the
//! configured static origin and its response is relayed as-is.

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{Request, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    Json,
};
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::error::ErrorResponse;
use crate::http::server::AppState;

pub type PassthroughClient = Client<HttpConnector, Body>;

/// Extract the authority of an `http://host:port` origin.
pub fn parse_origin(origin: &str) -> Option<Authority> {
    let uri: Uri = origin.parse().ok()?;
    if uri.scheme() != Some(&Scheme::HTTP) {
        return None;
    }
    uri.authority().cloned()
}

/// Fallback handler for every unmatched path.
pub async fn forward(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(authority) = state.static_origin.clone() else {
        tracing::debug!(path = %request.uri().path(), "No static origin configured");
        return (StatusCode::NOT_FOUND, Json(ErrorResponse { error: "Not found" })).into_response();
    };

    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build static origin URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    // The origin connection is HTTP/1.1 whatever the inbound version was.
    parts.version = Version::HTTP_11;

    tracing::debug!(uri = %parts.uri, method = %parts.method, "Forwarding to static origin");

    match state.passthrough.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "Static origin request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
