//! Galileo API client.
//!
//! `GalileoClient` is the entry point for direct API access: projects, log
//! streams, runs, alerts, and the legacy observe ingestion path. The
//! [`crate::logger::TraceLogger`] builds on the same client for identifier
//! resolution and event ingestion.
//!
//! # Example
//!
//! ```ignore
//! use galileo_observe::{GalileoClient, ObserveConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ObserveConfig::new("gk_...", "my-project");
//!     let client = GalileoClient::new(&config)?;
//!
//!     let project = client.projects().get_or_create("my-project").await?;
//!     let stream = client
//!         .log_streams()
//!         .get_or_create(&project.id, "production")
//!         .await?;
//!     println!("logging to {}/{}", project.id, stream.id);
//!     Ok(())
//! }
//! ```

pub mod alerts;
pub mod auth;
pub mod log_streams;
pub mod observe;
pub mod projects;
pub mod runs;

use serde::Deserialize;

use crate::config::{AuthMethod, ObserveConfig};
use crate::errors::ObserveError;
use crate::http::HttpClient;

pub use alerts::{Alert, AlertChannel, AlertCondition, AlertsClient, CreateAlertRequest};
pub use auth::AccessToken;
pub use log_streams::{LogStream, LogStreamsClient};
pub use observe::{ObserveIngestClient, WorkflowStep};
pub use projects::{Project, ProjectDetail, ProjectType, ProjectsClient};
pub use runs::{ChainRow, PromptScorersConfig, Run, RunsClient};

/// Envelope used by v2 list/create responses.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Galileo API client.
///
/// Holds the HTTP client and base URL; sub-clients borrow it per endpoint
/// family.
pub struct GalileoClient {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
}

impl GalileoClient {
    /// Create a client from a config.
    ///
    /// Requires `config.api_key`; the credential is sent on every request
    /// according to `config.auth`.
    pub fn new(config: &ObserveConfig) -> Result<Self, ObserveError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ObserveError::auth("no API key configured"))?;
        Self::with_credentials(&config.base_url, api_key, config.auth, config.timeout_secs)
    }

    /// Create a client with an explicit credential and auth method.
    pub fn with_credentials(
        base_url: &str,
        credential: &str,
        auth: AuthMethod,
        timeout_secs: u64,
    ) -> Result<Self, ObserveError> {
        let http = HttpClient::new(base_url, credential, auth, timeout_secs)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a reference to the HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Get a Projects API client.
    pub fn projects(&self) -> ProjectsClient<'_> {
        ProjectsClient::new(self)
    }

    /// Get a Log Streams API client.
    pub fn log_streams(&self) -> LogStreamsClient<'_> {
        LogStreamsClient::new(self)
    }

    /// Get a Runs API client (legacy evaluation runs and chain ingestion).
    pub fn runs(&self) -> RunsClient<'_> {
        RunsClient::new(self)
    }

    /// Get an Alerts API client.
    pub fn alerts(&self) -> AlertsClient<'_> {
        AlertsClient::new(self)
    }

    /// Get a client for the legacy observe ingestion path.
    pub fn observe(&self) -> ObserveIngestClient<'_> {
        ObserveIngestClient::new(self)
    }
}

impl std::fmt::Debug for GalileoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalileoClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = ObserveConfig::default();
        let result = GalileoClient::new(&config);
        assert!(matches!(result, Err(ObserveError::Authentication(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = GalileoClient::with_credentials(
            "https://api.galileo.ai/",
            "gk_test",
            AuthMethod::Bearer,
            30,
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://api.galileo.ai");
    }
}
