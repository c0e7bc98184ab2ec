//! Workflow API client.
//!
//! # Responsibilities
//! - Build the run envelope (`workflow_id`, `parameters`, `connector_id`)
//! - Authenticate with a token from [`TokenSelector`]
//! - Unwrap the JSON-encoded `data` string of the response
//!
//! # Design Decisions
//! - One token lookup and one run per call, no retries
//! - A `data` field that fails to decode is logged and the envelope is
//!   returned untouched; it never fails the call

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::schema::ModeLabels;
use crate::config::WorkflowConfig;
use crate::error::{GatewayError, Result};
use crate::upstream::token::TokenSelector;

const SERVICE: &str = "workflow API";

/// Which workflow behaviour a run selects. Never taken from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMode {
    DetailPage,
    Search,
    IncrementViewCount,
}

/// Parameters object of a run request. Field names are fixed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowParameters {
    #[serde(rename = "LIMIT")]
    pub limit: u32,
    #[serde(rename = "Mode")]
    pub mode: String,
    #[serde(rename = "Page_Integer")]
    pub page: u32,
    #[serde(rename = "Search_String")]
    pub search_string: String,
}

/// Body of `POST /v1/workflow/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRequest {
    pub workflow_id: String,
    pub parameters: WorkflowParameters,
    pub connector_id: String,
}

/// Normalized workflow response.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowPayload {
    /// The `data` string decoded as JSON.
    Decoded(Value),
    /// The outer envelope, passed through unchanged.
    Raw(Value),
}

impl WorkflowPayload {
    /// Normalize a response envelope.
    pub fn from_envelope(envelope: Value) -> Self {
        let data = match envelope.get("data") {
            Some(Value::String(data)) if !data.is_empty() => data,
            _ => return Self::Raw(envelope),
        };

        match serde_json::from_str(data) {
            Ok(inner) => Self::Decoded(inner),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse data field, returning raw envelope");
                Self::Raw(envelope)
            }
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// JSON value sent back to the caller.
    pub fn into_json(self) -> Value {
        match self {
            Self::Decoded(value) | Self::Raw(value) => value,
        }
    }
}

/// Client for the workflow run endpoint.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
    api_url: String,
    workflow_id: String,
    connector_id: String,
    modes: ModeLabels,
    tokens: TokenSelector,
}

impl WorkflowClient {
    pub fn new(client: Client, config: &WorkflowConfig, tokens: TokenSelector) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            workflow_id: config.workflow_id.clone(),
            connector_id: config.connector_id.clone(),
            modes: config.modes.clone(),
            tokens,
        }
    }

    /// Build the request envelope for one run.
    pub fn build_request(
        &self,
        search_string: &str,
        mode: WorkflowMode,
        limit: u32,
        page: u32,
    ) -> WorkflowRequest {
        WorkflowRequest {
            workflow_id: self.workflow_id.clone(),
            parameters: WorkflowParameters {
                limit,
                mode: self.modes.label(mode).to_string(),
                page,
                search_string: search_string.to_string(),
            },
            connector_id: self.connector_id.clone(),
        }
    }

    /// Run the workflow and normalize its response.
    pub async fn fetch_api_data(
        &self,
        search_string: &str,
        mode: WorkflowMode,
        limit: u32,
        page: u32,
    ) -> Result<WorkflowPayload> {
        let token = self.tokens.resolve().await?;
        let request = self.build_request(search_string, mode, limit, page);

        tracing::debug!(
            mode = ?mode,
            limit,
            page,
            static_token = self.tokens.has_static_token(),
            "Running workflow"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(SERVICE, status));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::protocol(format!("invalid workflow response: {}", e)))?;

        Ok(WorkflowPayload::from_envelope(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::token::TokenProvider;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer, static_token: Option<&str>) -> WorkflowClient {
        let http = Client::new();
        let config = WorkflowConfig {
            workflow_id: "7400000000".into(),
            api_url: server.url("/v1/workflow/run"),
            ..WorkflowConfig::default()
        };
        let tokens = TokenSelector::new(
            static_token.map(String::from),
            TokenProvider::new(http.clone(), server.url("/token")),
        );
        WorkflowClient::new(http, &config, tokens)
    }

    #[test]
    fn test_request_envelope_shape() {
        let server = MockServer::start();
        let request = client(&server, Some("pat")).build_request("cat", WorkflowMode::Search, 5, 2);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "workflow_id": "7400000000",
                "parameters": {
                    "LIMIT": 5,
                    "Mode": "search",
                    "Page_Integer": 2,
                    "Search_String": "cat"
                },
                "connector_id": "1024"
            })
        );
    }

    #[test]
    fn test_mode_labels() {
        let server = MockServer::start();
        let client = client(&server, Some("pat"));
        let label = |mode| client.build_request("", mode, 1, 1).parameters.mode;

        assert_eq!(label(WorkflowMode::DetailPage), "detail page");
        assert_eq!(label(WorkflowMode::Search), "search");
        assert_eq!(label(WorkflowMode::IncrementViewCount), "increment view count");
    }

    #[test]
    fn test_payload_decodes_inner_data() {
        let payload = WorkflowPayload::from_envelope(json!({"code": 0, "data": "{\"a\":1}"}));
        assert_eq!(payload, WorkflowPayload::Decoded(json!({"a": 1})));
    }

    #[test]
    fn test_payload_keeps_envelope_when_data_is_not_json() {
        let envelope = json!({"code": 0, "data": "not json"});
        let payload = WorkflowPayload::from_envelope(envelope.clone());
        assert!(!payload.is_decoded());
        assert_eq!(payload.into_json(), envelope);
    }

    #[test]
    fn test_payload_without_string_data_is_raw() {
        for envelope in [
            json!({"code": 4000, "msg": "bad"}),
            json!({"data": ""}),
            json!({"data": {"already": "object"}}),
        ] {
            assert_eq!(
                WorkflowPayload::from_envelope(envelope.clone()),
                WorkflowPayload::Raw(envelope)
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_and_body() {
        let server = MockServer::start_async().await;
        let run = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/workflow/run")
                    .header("authorization", "Bearer pat_static")
                    .json_body(json!({
                        "workflow_id": "7400000000",
                        "parameters": {
                            "LIMIT": 1,
                            "Mode": "detail page",
                            "Page_Integer": 1,
                            "Search_String": "20240101"
                        },
                        "connector_id": "1024"
                    }));
                then.status(200).json_body(json!({"data": "{\"items\":[1,2]}"}));
            })
            .await;

        let payload = client(&server, Some("pat_static"))
            .fetch_api_data("20240101", WorkflowMode::DetailPage, 1, 1)
            .await
            .unwrap();

        assert_eq!(payload, WorkflowPayload::Decoded(json!({"items": [1, 2]})));
        run.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_uses_token_service_without_static_token() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(200).json_body(json!({"access_token": "tok_fetched"}));
            })
            .await;
        let run = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/workflow/run")
                    .header("authorization", "Bearer tok_fetched");
                then.status(200).json_body(json!({"data": "[]"}));
            })
            .await;

        client(&server, None)
            .fetch_api_data("", WorkflowMode::Search, 1, 1)
            .await
            .unwrap();

        assert_eq!(token.hits_async().await, 1);
        assert_eq!(run.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status_without_retry() {
        let server = MockServer::start_async().await;
        let run = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/workflow/run");
                then.status(500).body("boom");
            })
            .await;

        let err = client(&server, Some("pat"))
            .fetch_api_data("x", WorkflowMode::Search, 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Upstream { status: 500, .. }));
        assert_eq!(run.hits_async().await, 1);
    }
}
