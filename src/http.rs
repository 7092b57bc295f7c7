//! HTTP client for Galileo API calls.
//!
//! Async client over `reqwest` with configurable authentication (either a
//! `Galileo-API-Key` header or `Authorization: Bearer`), JSON handling, and error
//! details that carry status code and a response body snippet.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::AuthMethod;

const DEFAULT_POOL_SIZE: usize = 8;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP error details.
#[derive(Debug, Clone)]
pub struct HttpErrorDetail {
    pub status: u16,
    pub url: String,
    pub message: String,
    pub body_snippet: Option<String>,
}

impl std::fmt::Display for HttpErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} for {}: {}", self.status, self.url, self.message)?;
        if let Some(ref snippet) = self.body_snippet {
            let truncated: String = snippet.chars().take(200).collect();
            write!(f, " | body[0:200]={}", truncated)?;
        }
        Ok(())
    }
}

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(
        "request failed: {err} (is_connect={connect}, is_timeout={timeout})",
        err = .0,
        connect = .0.is_connect(),
        timeout = .0.is_timeout()
    )]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Response(HttpErrorDetail),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("json parse error: {0}")]
    JsonParse(String),
}

impl HttpError {
    /// Create an HTTP error from a response.
    pub fn from_response(status: u16, url: &str, body: Option<&str>) -> Self {
        // Keep enough body to preserve structured JSON error payloads.
        // Display paths still truncate to 200 chars.
        let body_snippet = body.map(|s| s.chars().take(4096).collect());
        HttpError::Response(HttpErrorDetail {
            status,
            url: url.to_string(),
            message: "request_failed".to_string(),
            body_snippet,
        })
    }

    /// Get the HTTP status code, if available.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Response(detail) => Some(detail.status),
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Async HTTP client for the Galileo API.
///
/// # Example
///
/// ```ignore
/// let client = HttpClient::new("https://api.galileo.ai", "gk_...", AuthMethod::Bearer, 30)?;
/// let result: Value = client.get("/v2/projects", Some(&[("name", "my-project")])).await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the API (without trailing slash)
    /// * `credential` - API key or bearer token; empty string sends no auth header
    /// * `auth` - Which header carries the credential
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(
        base_url: &str,
        credential: &str,
        auth: AuthMethod,
        timeout_secs: u64,
    ) -> Result<Self, HttpError> {
        url::Url::parse(base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("galileo-observe/", env!("CARGO_PKG_VERSION"))),
        );

        if !credential.is_empty() {
            match auth {
                AuthMethod::Bearer => {
                    let auth_value = format!("Bearer {}", credential);
                    headers.insert(
                        AUTHORIZATION,
                        HeaderValue::from_str(&auth_value).map_err(|_| {
                            HttpError::InvalidUrl("invalid credential characters".to_string())
                        })?,
                    );
                }
                AuthMethod::ApiKeyHeader => {
                    headers.insert(
                        "Galileo-API-Key",
                        HeaderValue::from_str(credential).map_err(|_| {
                            HttpError::InvalidUrl("invalid credential characters".to_string())
                        })?,
                    );
                }
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(DEFAULT_POOL_SIZE)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .map_err(HttpError::Request)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert a relative path to an absolute URL.
    fn abs_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let path = path.trim_start_matches('/');

        // Handle /v2 prefix duplication when the base URL already carries it
        if self.base_url.ends_with("/v2") && path.starts_with("v2/") {
            return format!("{}/{}", self.base_url, &path[3..]);
        }

        format!("{}/{}", self.base_url, path)
    }

    /// Make a GET request.
    ///
    /// # Arguments
    ///
    /// * `path` - API path (relative or absolute)
    /// * `params` - Optional query parameters
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<T, HttpError> {
        let url = self.abs_url(path);
        let mut req = self.client.get(&url);

        if let Some(p) = params {
            req = req.query(p);
        }

        let request = req.build().map_err(HttpError::Request)?;
        let (status, body) = self.send(request).await?;
        self.parse_json(status, &url, &body)
    }

    /// Make a GET request returning raw JSON Value.
    pub async fn get_json(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<Value, HttpError> {
        self.get(path, params).await
    }

    /// Make a POST request with JSON body.
    ///
    /// Any 2xx status is treated as success; create endpoints returning 201
    /// and ingestion endpoints returning 202 go through the same path.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, HttpError> {
        let url = self.abs_url(path);
        let request = self
            .client
            .post(&url)
            .json(body)
            .build()
            .map_err(HttpError::Request)?;
        let (status, body_bytes) = self.send(request).await?;
        self.parse_json(status, &url, &body_bytes)
    }

    /// Make a POST request with JSON body, discarding any response body.
    pub async fn post_json_no_content(&self, path: &str, body: &Value) -> Result<(), HttpError> {
        let url = self.abs_url(path);
        let request = self
            .client
            .post(&url)
            .json(body)
            .build()
            .map_err(HttpError::Request)?;
        let (status, body_bytes) = self.send(request).await?;
        if (200..300).contains(&status) {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&body_bytes);
        Err(HttpError::from_response(
            status,
            &url,
            if text.trim().is_empty() { None } else { Some(&text) },
        ))
    }

    fn parse_json<T: DeserializeOwned>(
        &self,
        status: u16,
        url: &str,
        body: &[u8],
    ) -> Result<T, HttpError> {
        if !(200..300).contains(&status) {
            let text = String::from_utf8_lossy(body);
            return Err(HttpError::from_response(status, url, Some(&text)));
        }

        serde_json::from_slice(body).map_err(|e| {
            let text = String::from_utf8_lossy(body);
            let preview: String = text.chars().take(100).collect();
            HttpError::JsonParse(format!("{}: {}", e, preview))
        })
    }

    async fn send(&self, request: reqwest::Request) -> Result<(u16, bytes::Bytes), HttpError> {
        let resp = self.client.execute(request).await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok((status, body))
    }
}
