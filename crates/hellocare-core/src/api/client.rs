//! Gateway client for the HelloCare REST API.
//!
//! Every backend call goes through `ApiClient::send`, which attaches the
//! session's bearer credential and, when the backend answers 401 to
//! anything but the login call, invalidates the session before returning
//! the error to the caller. Calls are independent and never retried.

use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{ApiError, OutboundRequest};
use crate::auth::SessionStore;
use crate::config::Config;

/// Backend endpoint that exchanges email/password for a custom token
pub const LOGIN_PATH: &str = "/auth/admin/login";

/// API client for the HelloCare backend.
/// Clone is cheap - reqwest::Client and SessionStore are both shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.credential() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| {
                    ApiError::Unknown("Credential is not a valid header value".to_string())
                })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send one request and decode the JSON response
    pub async fn send<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<T, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, path = %request.path, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.auth_headers()?);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(path = %request.path, error = %e, "Request failed");
            ApiError::Network(e)
        })?;

        let response = self.check_response(&request, response).await?;

        // Response arrived; an unreadable body is Unknown, not Network
        let text = response.text().await.map_err(|e| {
            warn!(path = %request.path, error = %e, "Failed to read response body");
            ApiError::Unknown(format!(
                "Failed to read response body from {}: {}",
                request.path, e
            ))
        })?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            ApiError::Unknown(format!(
                "Failed to parse JSON response from {}: {}",
                request.path, e
            ))
        })
    }

    /// Check if response is successful, returning an error with body if not.
    /// A 401 outside the login call invalidates the session first.
    async fn check_response(
        &self,
        request: &OutboundRequest,
        response: Response,
    ) -> Result<Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(path = %request.path, error = %e, "Failed to read error response body");
                String::new()
            }
        };
        let error = ApiError::from_status(status, &body);

        if error.is_auth_rejected() && !request.is_login() {
            warn!(path = %request.path, "Credential rejected, ending session");
            self.session.invalidate();
        } else {
            warn!(
                path = %request.path,
                status = status.as_u16(),
                error = %error,
                "Request rejected"
            );
        }
        Err(error)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(OutboundRequest::get(path)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(OutboundRequest::post(path).json(body)?).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(OutboundRequest::put(path).json(body)?).await
    }

}
