//! Configuration for the Galileo SDK.
//!
//! The core never reads environment variables on its own; callers either
//! fill in `ObserveConfig` explicitly or opt in via [`ObserveConfig::from_env`].

use serde::{Deserialize, Serialize};

/// Default base URL for the Galileo API.
pub const DEFAULT_BASE_URL: &str = "https://api.galileo.ai";

/// Default log stream name when none is configured.
pub const DEFAULT_LOG_STREAM: &str = "production";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which header carries the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthMethod {
    /// Use `Authorization: Bearer` header (raw API key or exchanged token).
    Bearer,
    /// Use `Galileo-API-Key` header.
    ApiKeyHeader,
}

impl Default for AuthMethod {
    fn default() -> Self {
        AuthMethod::Bearer
    }
}

impl std::str::FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(AuthMethod::Bearer),
            "api_key" | "api_key_header" => Ok(AuthMethod::ApiKeyHeader),
            other => Err(format!("unknown auth method: {}", other)),
        }
    }
}

/// Configuration for [`crate::logger::TraceLogger`] and [`crate::api::GalileoClient`].
///
/// When `project_id`/`log_stream_id` are absent the logger resolves them by
/// name against the remote service, creating the resources if needed. When
/// the credential or the identifiers cannot be resolved locally the logger
/// degrades to dry-run mode instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserveConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// API key; `None` forces dry-run mode.
    pub api_key: Option<String>,
    /// Pre-resolved project identifier.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Project name, used for lookup-or-create when no identifier is given.
    pub project_name: String,
    /// Pre-resolved log stream identifier.
    #[serde(default)]
    pub log_stream_id: Option<String>,
    /// Log stream name, used for lookup-or-create when no identifier is given.
    pub log_stream_name: String,
    /// Optional session identifier attached to ingestion payloads.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Authentication header selector.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Force dry-run mode: all operations succeed locally, flush writes to
    /// the log output instead of the network.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            project_id: None,
            project_name: "default".to_string(),
            log_stream_id: None,
            log_stream_name: DEFAULT_LOG_STREAM.to_string(),
            session_id: None,
            auth: AuthMethod::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dry_run: false,
        }
    }
}

impl ObserveConfig {
    /// Create a config with an API key and project name, defaults elsewhere.
    pub fn new(api_key: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// Build a config from `GALILEO_*` environment variables.
    ///
    /// Reads `GALILEO_API_KEY`, `GALILEO_API_URL`, `GALILEO_PROJECT_ID`,
    /// `GALILEO_PROJECT_NAME`, `GALILEO_LOG_STREAM_ID`, `GALILEO_LOG_STREAM`,
    /// `GALILEO_AUTH_METHOD` (`bearer` or `api_key`).
    pub fn from_env() -> Self {
        let getenv = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
        };
        let auth = match getenv("GALILEO_AUTH_METHOD") {
            Some(value) => match value.parse() {
                Ok(method) => method,
                Err(_) => {
                    tracing::warn!(
                        value = %value,
                        "unrecognized GALILEO_AUTH_METHOD, using bearer auth"
                    );
                    AuthMethod::default()
                }
            },
            None => AuthMethod::default(),
        };
        Self {
            base_url: getenv("GALILEO_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: getenv("GALILEO_API_KEY"),
            project_id: getenv("GALILEO_PROJECT_ID"),
            project_name: getenv("GALILEO_PROJECT_NAME").unwrap_or_else(|| "default".to_string()),
            log_stream_id: getenv("GALILEO_LOG_STREAM_ID"),
            log_stream_name: getenv("GALILEO_LOG_STREAM")
                .unwrap_or_else(|| DEFAULT_LOG_STREAM.to_string()),
            auth,
            ..Self::default()
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the log stream name.
    pub fn with_log_stream(mut self, name: impl Into<String>) -> Self {
        self.log_stream_name = name.into();
        self
    }

    /// Attach a session identifier to all ingestion payloads.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Force dry-run mode.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObserveConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.log_stream_name, "production");
        assert!(!config.dry_run);
        assert_eq!(config.auth, AuthMethod::Bearer);
    }

    #[test]
    fn test_builder_chain() {
        let config = ObserveConfig::new("gk_test", "my-project")
            .with_base_url("https://console.example.com")
            .with_log_stream("staging")
            .with_session_id("sess-1")
            .dry_run();
        assert_eq!(config.api_key.as_deref(), Some("gk_test"));
        assert_eq!(config.project_name, "my-project");
        assert_eq!(config.base_url, "https://console.example.com");
        assert_eq!(config.log_stream_name, "staging");
        assert_eq!(config.session_id.as_deref(), Some("sess-1"));
        assert!(config.dry_run);
    }

    #[test]
    fn test_auth_method_from_str() {
        assert_eq!("bearer".parse::<AuthMethod>().unwrap(), AuthMethod::Bearer);
        assert_eq!(
            "api_key".parse::<AuthMethod>().unwrap(),
            AuthMethod::ApiKeyHeader
        );
        assert_eq!(
            " API_KEY_HEADER ".parse::<AuthMethod>().unwrap(),
            AuthMethod::ApiKeyHeader
        );
        assert!("basic".parse::<AuthMethod>().is_err());
    }

    #[test]
    fn test_auth_method_from_env() {
        std::env::set_var("GALILEO_AUTH_METHOD", "api_key");
        let config = ObserveConfig::from_env();
        std::env::remove_var("GALILEO_AUTH_METHOD");
        assert_eq!(config.auth, AuthMethod::ApiKeyHeader);
    }

    #[test]
    fn test_auth_method_serde() {
        let json = serde_json::to_string(&AuthMethod::ApiKeyHeader).unwrap();
        assert!(json.contains("api_key_header"));
        let parsed: AuthMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AuthMethod::ApiKeyHeader);
    }
}
