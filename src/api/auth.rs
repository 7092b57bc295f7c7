//! API-key to bearer-token exchange.
//!
//! The legacy v1 endpoints authenticate with a short-lived bearer token
//! obtained from `POST /login/api_key`; the v2 endpoints accept the API key
//! directly. [`GalileoClient::login`] performs the exchange and returns a
//! client authorized with the resulting token.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::GalileoClient;
use crate::config::{AuthMethod, ObserveConfig};
use crate::errors::ObserveError;
use crate::http::HttpClient;

const LOGIN_ENDPOINT: &str = "/login/api_key";

/// Bearer token returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Exchange an API key for a bearer token.
///
/// The key travels in the request body; no auth header is sent.
pub async fn exchange_api_key(
    base_url: &str,
    api_key: &str,
    timeout_secs: u64,
) -> Result<AccessToken, ObserveError> {
    if api_key.trim().is_empty() {
        return Err(ObserveError::auth("empty API key"));
    }
    let http = HttpClient::new(base_url, "", AuthMethod::Bearer, timeout_secs)?;
    let token: AccessToken = http
        .post_json(LOGIN_ENDPOINT, &json!({ "api_key": api_key }))
        .await?;
    Ok(token)
}

impl GalileoClient {
    /// Log in with the configured API key and return a client that sends
    /// the exchanged bearer token on every request.
    pub async fn login(config: &ObserveConfig) -> Result<Self, ObserveError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ObserveError::auth("no API key configured"))?;
        let token = exchange_api_key(&config.base_url, api_key, config.timeout_secs).await?;
        Self::with_credentials(
            &config.base_url,
            &token.access_token,
            AuthMethod::Bearer,
            config.timeout_secs,
        )
    }
}
