//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::upstream::workflow::WorkflowMode;

/// Connector identifier the workflow API expects from this integration.
pub const DEFAULT_CONNECTOR_ID: &str = "1024";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Workflow API settings.
    pub workflow: WorkflowConfig,

    /// Token service used when no static token is configured.
    pub token_service: TokenServiceConfig,

    /// Origin receiving every request outside the API paths.
    pub static_assets: StaticAssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Workflow API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Identifier of the workflow to run.
    pub workflow_id: String,

    /// Static bearer token. When absent or blank the token service is asked.
    pub access_token: Option<String>,

    /// Full URL of the workflow run endpoint.
    pub api_url: String,

    /// Connector identifier sent with every run.
    pub connector_id: String,

    /// Literal `Mode` labels understood by the workflow.
    pub modes: ModeLabels,
}

impl WorkflowConfig {
    /// Returns the static token if one is configured and not blank.
    pub fn static_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            workflow_id: String::new(),
            access_token: None,
            api_url: "https://api.coze.cn/v1/workflow/run".to_string(),
            connector_id: DEFAULT_CONNECTOR_ID.to_string(),
            modes: ModeLabels::default(),
        }
    }
}

/// Mode labels sent in the `Mode` parameter.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModeLabels {
    pub detail_page: String,
    pub search: String,
    pub increment_view_count: String,
}

impl ModeLabels {
    /// Label for the given mode.
    pub fn label(&self, mode: WorkflowMode) -> &str {
        match mode {
            WorkflowMode::DetailPage => &self.detail_page,
            WorkflowMode::Search => &self.search,
            WorkflowMode::IncrementViewCount => &self.increment_view_count,
        }
    }
}

impl Default for ModeLabels {
    fn default() -> Self {
        Self {
            detail_page: "detail page".to_string(),
            search: "search".to_string(),
            increment_view_count: "increment view count".to_string(),
        }
    }
}

/// Token service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenServiceConfig {
    /// URL answering GET with `{"access_token": "..."}`.
    pub url: String,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            url: "https://coze-token/".to_string(),
        }
    }
}

/// Static asset origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StaticAssetsConfig {
    /// Base URL (e.g., "http://127.0.0.1:3000"). Unset means 404 for unmatched paths.
    pub origin: Option<String>,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size read during parameter extraction, in bytes.
    pub max_body_bytes: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) used when RUST_LOG is unset.
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
