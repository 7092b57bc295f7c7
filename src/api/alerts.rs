//! Alerts API client.
//!
//! Alerts attach metric conditions to a project and notify configured
//! channels when a condition holds over its evaluation window. This is a
//! sibling of the logging path; the trace logger does not use it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GalileoClient;
use crate::errors::ObserveError;

/// A metric condition for an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCondition {
    /// The field to monitor (e.g., `score_pii`).
    pub field: String,
    /// Aggregation over the window (e.g., `avg`).
    pub aggregation: String,
    /// Comparison operator (e.g., `gt`).
    pub operator: String,
    /// Threshold value.
    pub value: Value,
    /// Evaluation window in seconds.
    pub window: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_operator: Option<String>,
}

/// A notification channel for an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertChannel {
    /// Channel type (e.g., `email`).
    #[serde(rename = "type")]
    pub channel_type: String,
    /// Channel-specific configuration (e.g., recipient list).
    pub config: Value,
    pub enabled: bool,
}

impl AlertChannel {
    /// Create an email channel with the given recipients.
    pub fn email(recipients: &[&str]) -> Self {
        Self {
            channel_type: "email".to_string(),
            config: serde_json::json!({ "recipients": recipients }),
            enabled: true,
        }
    }
}

/// Request body for alert creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlertRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub conditions: Vec<AlertCondition>,
    /// Check interval in seconds.
    pub interval: i64,
    pub channels: Vec<AlertChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub enabled: bool,
}

/// A configured alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<AlertCondition>,
    #[serde(default)]
    pub interval: i64,
    #[serde(default)]
    pub channels: Vec<AlertChannel>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Alerts API client.
pub struct AlertsClient<'a> {
    client: &'a GalileoClient,
}

impl<'a> AlertsClient<'a> {
    pub(crate) fn new(client: &'a GalileoClient) -> Self {
        Self { client }
    }

    /// Create an alert for a project.
    pub async fn create(
        &self,
        project_id: &str,
        request: &CreateAlertRequest,
    ) -> Result<Alert, ObserveError> {
        let path = format!("/projects/{}/alerts/create", project_id);
        let body = serde_json::to_value(request)?;
        let alert: Alert = self.client.http.post_json(&path, &body).await?;
        Ok(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_channel() {
        let channel = AlertChannel::email(&["ops@example.com"]);
        let value = serde_json::to_value(&channel).unwrap();
        assert_eq!(value["type"], "email");
        assert_eq!(value["config"]["recipients"][0], "ops@example.com");
        assert_eq!(value["enabled"], true);
    }

    #[test]
    fn test_request_serialization() {
        let request = CreateAlertRequest {
            name: "High PII Detection Alert".to_string(),
            description: "Alert when PII content is detected".to_string(),
            tags: vec!["security".to_string(), "pii".to_string()],
            conditions: vec![AlertCondition {
                field: "score_pii".to_string(),
                aggregation: "avg".to_string(),
                operator: "gt".to_string(),
                value: json!(0.7),
                window: 900,
                condition_type: Some("metric/numeric/1".to_string()),
                filter_value: None,
                filter_operator: None,
            }],
            interval: 300,
            channels: vec![AlertChannel::email(&["ops@example.com"])],
            metadata: None,
            enabled: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["conditions"][0]["field"], "score_pii");
        assert_eq!(value["conditions"][0]["window"], 900);
        assert!(value.get("metadata").is_none());
        assert!(value["conditions"][0].get("filter_value").is_none());
    }
}
