//! Credential exchange with the identity provider.
//!
//! The backend's login endpoint returns a short-lived custom token. Before
//! it can be used as a bearer credential it is traded with the identity
//! provider for an ID token bound to the same user.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::config::Config;

#[async_trait]
pub trait CredentialExchanger: Send + Sync {
    /// Trade a short-lived token for a durable bearer credential
    async fn exchange(&self, short_lived_token: &str) -> Result<String, ApiError>;
}

/// Pick the exchanger for the config: Firebase when an API key is set,
/// otherwise the backend token is used as-is.
pub fn for_config(config: &Config) -> Result<Arc<dyn CredentialExchanger>> {
    match config.firebase_api_key {
        Some(ref key) => Ok(Arc::new(FirebaseExchanger::new(
            &config.identity_url,
            key,
            Duration::from_secs(config.request_timeout_secs),
        )?)),
        None => {
            warn!("No identity provider API key configured, using backend tokens directly");
            Ok(Arc::new(PassthroughExchanger))
        }
    }
}

/// Uses the backend's token as the bearer credential
pub struct PassthroughExchanger;

#[async_trait]
impl CredentialExchanger for PassthroughExchanger {
    async fn exchange(&self, short_lived_token: &str) -> Result<String, ApiError> {
        Ok(short_lived_token.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    token: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
}

/// Firebase Identity Toolkit `accounts:signInWithCustomToken`
pub struct FirebaseExchanger {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirebaseExchanger {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl CredentialExchanger for FirebaseExchanger {
    async fn exchange(&self, short_lived_token: &str) -> Result<String, ApiError> {
        let url = format!("{}/v1/accounts:signInWithCustomToken", self.base_url);
        let body = SignInRequest {
            token: short_lived_token,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => {
                return Err(ApiError::Unknown(format!(
                    "Failed to read identity provider response: {}",
                    e
                )));
            }
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Failed to read error response body");
                String::new()
            }
        };
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }

        let parsed: SignInResponse = serde_json::from_str(&text).map_err(|e| {
            ApiError::Unknown(format!("Failed to parse identity provider response: {}", e))
        })?;
        if parsed.id_token.is_empty() {
            return Err(ApiError::Unknown(
                "Identity provider returned an empty ID token".to_string(),
            ));
        }

        debug!("Exchanged custom token for ID token");
        Ok(parsed.id_token)
    }
}
