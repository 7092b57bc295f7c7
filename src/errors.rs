//! Error types for the Galileo SDK.
//!
//! A single `ObserveError` enum covers transport, authentication, and usage
//! failures so callers can match on one type across the API surface.

use crate::http::HttpError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP error details for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorInfo {
    /// HTTP status code (e.g., 404, 500)
    pub status: u16,
    /// Request URL
    pub url: String,
    /// Error message
    pub message: String,
    /// First 200 chars of response body (for debugging)
    pub body_snippet: Option<String>,
}

impl std::fmt::Display for HttpErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} for {}: {}", self.status, self.url, self.message)?;
        if let Some(ref snippet) = self.body_snippet {
            let truncated: String = snippet.chars().take(200).collect();
            write!(f, " | body[0:200]={}", truncated)?;
        }
        Ok(())
    }
}

/// Unified error enum for the Galileo SDK.
#[derive(Debug, Error)]
pub enum ObserveError {
    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing failed
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request failed (network layer)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP response error (4xx/5xx)
    #[error("{0}")]
    HttpResponse(HttpErrorInfo),

    /// Authentication failed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Timeout error
    #[error("timeout: {0}")]
    Timeout(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ObserveError {
    /// Create an HTTP response error.
    pub fn http_response(status: u16, url: &str, message: &str, body: Option<&str>) -> Self {
        ObserveError::HttpResponse(HttpErrorInfo {
            status,
            url: url.to_string(),
            message: message.to_string(),
            body_snippet: body.map(|s| s.chars().take(200).collect()),
        })
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        ObserveError::Authentication(message.into())
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        ObserveError::Timeout(message.into())
    }

    /// Check if this is a retryable error (5xx, timeout, network).
    pub fn is_retryable(&self) -> bool {
        match self {
            ObserveError::HttpResponse(info) => info.status >= 500,
            ObserveError::Http(_) => true,
            ObserveError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Get HTTP status code if this is an HTTP error.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ObserveError::HttpResponse(info) => Some(info.status),
            ObserveError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<HttpError> for ObserveError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => ObserveError::Http(e),
            HttpError::Response(detail) => ObserveError::HttpResponse(HttpErrorInfo {
                status: detail.status,
                url: detail.url,
                message: detail.message,
                body_snippet: detail.body_snippet,
            }),
            HttpError::InvalidUrl(msg) => ObserveError::InvalidInput(msg),
            HttpError::JsonParse(msg) => ObserveError::Serialization(msg),
        }
    }
}

impl From<serde_json::Error> for ObserveError {
    fn from(err: serde_json::Error) -> Self {
        ObserveError::Serialization(err.to_string())
    }
}

/// Result type alias using ObserveError.
pub type ObserveResult<T> = Result<T, ObserveError>;
