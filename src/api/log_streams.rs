//! Log Streams API client.
//!
//! A log stream is a named destination within a project that groups
//! ingested traces.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{DataEnvelope, GalileoClient};
use crate::errors::ObserveError;

/// A log stream within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStream {
    pub id: String,
    pub name: String,
}

/// Log Streams API client.
pub struct LogStreamsClient<'a> {
    client: &'a GalileoClient,
}

impl<'a> LogStreamsClient<'a> {
    pub(crate) fn new(client: &'a GalileoClient) -> Self {
        Self { client }
    }

    fn endpoint(project_id: &str) -> String {
        format!("/v2/projects/{}/log_streams", project_id)
    }

    /// List log streams in a project, optionally filtered by name.
    pub async fn list(
        &self,
        project_id: &str,
        name: Option<&str>,
    ) -> Result<Vec<LogStream>, ObserveError> {
        let path = Self::endpoint(project_id);
        let params: Vec<(&str, &str)> = name.map(|n| ("name", n)).into_iter().collect();
        let response: DataEnvelope<Vec<LogStream>> = self
            .client
            .http
            .get(&path, if params.is_empty() { None } else { Some(&params) })
            .await?;
        Ok(response.data)
    }

    /// Find a log stream by exact name.
    pub async fn find_by_name(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<LogStream>, ObserveError> {
        let streams = self.list(project_id, Some(name)).await?;
        Ok(streams.into_iter().find(|s| s.name == name))
    }

    /// Create a log stream.
    pub async fn create(&self, project_id: &str, name: &str) -> Result<LogStream, ObserveError> {
        let path = Self::endpoint(project_id);
        let stream: LogStream = self
            .client
            .http
            .post_json(&path, &json!({ "name": name }))
            .await?;
        Ok(stream)
    }

    /// Resolve a log stream by name, creating it if absent.
    ///
    /// Same lookup-then-create race as
    /// [`ProjectsClient::get_or_create`](super::ProjectsClient::get_or_create).
    pub async fn get_or_create(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<LogStream, ObserveError> {
        if project_id.is_empty() {
            return Err(ObserveError::InvalidInput(
                "project id is required to resolve a log stream".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(ObserveError::InvalidInput(
                "log stream name is required".to_string(),
            ));
        }
        if let Some(stream) = self.find_by_name(project_id, name).await? {
            tracing::debug!(log_stream = %name, id = %stream.id, "found existing log stream");
            return Ok(stream);
        }
        tracing::info!(log_stream = %name, "log stream not found, creating");
        self.create(project_id, name).await
    }
}
