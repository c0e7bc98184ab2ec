//! API endpoint handlers.
//!
//! Each handler validates its parameters, runs the workflow once, and maps
//! the outcome to a JSON response:
//! - 200 with the normalized workflow payload
//! - 400 `{"error": <validation message>}`, before any upstream call
//! - 500 `{"error": "Internal server error"}` for everything else

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{GatewayError, Result};
use crate::http::params;
use crate::http::server::AppState;
use crate::upstream::{WorkflowMode, WorkflowPayload};

/// `/api/search`, `/wallpaper/search`
pub async fn search(State(state): State<AppState>, request: Request<Body>) -> Response {
    let params = match params::extract_search(request, state.max_body_bytes).await {
        Ok(params) => params,
        Err(e) => return reject("search", e),
    };

    let result = state
        .workflow
        .fetch_api_data(&params.search, WorkflowMode::Search, params.limit, params.page)
        .await;
    respond("Search API error", result)
}

/// `/api/detail`, `/wallpaper/detail`
pub async fn detail(State(state): State<AppState>, request: Request<Body>) -> Response {
    enddate_request(&state, request, WorkflowMode::DetailPage, "Detail API error").await
}

/// `/api/view`, `/wallpaper/view`
pub async fn view(State(state): State<AppState>, request: Request<Body>) -> Response {
    enddate_request(&state, request, WorkflowMode::IncrementViewCount, "View API error").await
}

async fn enddate_request(
    state: &AppState,
    request: Request<Body>,
    mode: WorkflowMode,
    failure: &'static str,
) -> Response {
    let params = match params::extract_enddate(request, state.max_body_bytes).await {
        Ok(params) => params,
        Err(e) => return reject("enddate", e),
    };

    let result = state
        .workflow
        .fetch_api_data(&params.enddate, mode, 1, 1)
        .await;
    respond(failure, result)
}

fn reject(kind: &'static str, err: GatewayError) -> Response {
    tracing::debug!(kind, error = %err, "Rejected request parameters");
    err.into_response()
}

fn respond(failure: &'static str, result: Result<WorkflowPayload>) -> Response {
    match result {
        Ok(payload) => {
            tracing::debug!(decoded = payload.is_decoded(), "Workflow call succeeded");
            (StatusCode::OK, Json(payload.into_json())).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "{}", failure);
            e.into_response()
        }
    }
}
