//! Projects API client.
//!
//! Lookup, creation, and lookup-or-create resolution of projects by name.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{DataEnvelope, GalileoClient};
use crate::errors::ObserveError;

const PROJECTS_V2_ENDPOINT: &str = "/v2/projects";
const PROJECTS_V1_ENDPOINT: &str = "/projects";

/// A project as returned by the v2 endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Project type for legacy v1 creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Production monitoring project.
    LlmMonitor,
    /// Prompt evaluation project (runs and chain ingestion).
    PromptEvaluation,
}

/// Full project record returned by legacy v1 creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Projects API client.
pub struct ProjectsClient<'a> {
    client: &'a GalileoClient,
}

impl<'a> ProjectsClient<'a> {
    pub(crate) fn new(client: &'a GalileoClient) -> Self {
        Self { client }
    }

    /// Search projects by name.
    ///
    /// The server treats the name as a filter, not an exact match; use
    /// [`find_by_name`](Self::find_by_name) when resolving identifiers.
    pub async fn search(&self, name: &str) -> Result<Vec<Project>, ObserveError> {
        let response: DataEnvelope<Vec<Project>> = self
            .client
            .http
            .get(PROJECTS_V2_ENDPOINT, Some(&[("name", name)]))
            .await?;
        Ok(response.data)
    }

    /// Find a project by exact name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Project>, ObserveError> {
        let projects = self.search(name).await?;
        Ok(projects.into_iter().find(|p| p.name == name))
    }

    /// Create a project.
    pub async fn create(&self, name: &str) -> Result<Project, ObserveError> {
        let response: DataEnvelope<Project> = self
            .client
            .http
            .post_json(PROJECTS_V2_ENDPOINT, &json!({ "name": name }))
            .await?;
        Ok(response.data)
    }

    /// Resolve a project by name, creating it if absent.
    ///
    /// Lookup-then-create is not transactionally safe: two concurrent
    /// resolutions of the same name may both observe "not found" and both
    /// create, leaving duplicates. The API offers no compare-and-swap
    /// primitive at this boundary.
    pub async fn get_or_create(&self, name: &str) -> Result<Project, ObserveError> {
        if let Some(project) = self.find_by_name(name).await? {
            tracing::debug!(project = %name, id = %project.id, "found existing project");
            return Ok(project);
        }
        tracing::info!(project = %name, "project not found, creating");
        self.create(name).await
    }

    /// Create a typed project via the legacy v1 endpoint.
    pub async fn create_with_type(
        &self,
        name: &str,
        project_type: ProjectType,
    ) -> Result<ProjectDetail, ObserveError> {
        let body = json!({
            "name": name,
            "is_public": false,
            "type": project_type,
        });
        let detail: ProjectDetail = self
            .client
            .http
            .post_json(PROJECTS_V1_ENDPOINT, &body)
            .await?;
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProjectType::LlmMonitor).unwrap(),
            "\"llm_monitor\""
        );
        assert_eq!(
            serde_json::to_string(&ProjectType::PromptEvaluation).unwrap(),
            "\"prompt_evaluation\""
        );
    }

    #[test]
    fn test_project_detail_deserialization() {
        let detail: ProjectDetail = serde_json::from_str(
            r#"{"id": "p1", "name": "monitor", "type": "llm_monitor", "created_at": "2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(detail.id, "p1");
        assert_eq!(detail.project_type, ProjectType::LlmMonitor);
        assert!(!detail.is_public);
        assert!(detail.updated_at.is_none());
    }
}
