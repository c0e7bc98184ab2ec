//! Bearer token acquisition.
//!
//! # Responsibilities
//! - Fetch a token from the token service (`GET`, `{"access_token": ...}`)
//! - Prefer the statically configured token when one is set
//!
//! # Design Decisions
//! - No caching: the choice is re-evaluated on every workflow call
//! - No retries: a failed fetch fails the request

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{GatewayError, Result};

const SERVICE: &str = "token service";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Client for the token-issuing service.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: Client,
    url: String,
}

impl TokenProvider {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Request a fresh token from the token service.
    pub async fn get_token(&self) -> Result<String> {
        tracing::debug!(url = %self.url, "Requesting access token");

        let response = self
            .client
            .get(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(SERVICE, status));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::protocol(format!("invalid token response: {}", e)))?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(GatewayError::protocol("Response does not contain access_token")),
        }
    }
}

/// Two-tier token choice: static token first, token service otherwise.
#[derive(Debug, Clone)]
pub struct TokenSelector {
    static_token: Option<String>,
    provider: TokenProvider,
}

impl TokenSelector {
    /// `static_token` is dropped when blank.
    pub fn new(static_token: Option<String>, provider: TokenProvider) -> Self {
        Self {
            static_token: static_token.filter(|t| !t.trim().is_empty()),
            provider,
        }
    }

    pub fn has_static_token(&self) -> bool {
        self.static_token.is_some()
    }

    /// Token to present on the next workflow call.
    pub async fn resolve(&self) -> Result<String> {
        match &self.static_token {
            Some(token) => Ok(token.clone()),
            None => self.provider.get_token().await,
        }
    }
}
