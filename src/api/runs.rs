//! Runs API client (legacy evaluation path).
//!
//! Prompt-evaluation projects organize ingested data into runs; each run
//! accepts chain rows (one row per node in a prompt chain) together with a
//! scorer configuration selecting which quality metrics the service
//! computes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::GalileoClient;
use crate::errors::ObserveError;

/// A run within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub num_samples: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One node in a prompt chain, as ingested by the chains endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRow {
    pub node_id: Uuid,
    pub node_type: String,
    pub node_name: String,
    pub node_input: String,
    pub node_output: String,
    /// Root of the chain this node belongs to.
    pub chain_root_id: Uuid,
    pub chain_id: Uuid,
    /// Position within the chain.
    pub step: i64,
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_input_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_output_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_total_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl ChainRow {
    /// Create a single-node LLM chain; node, chain, and root share one id.
    pub fn llm(input: impl Into<String>, output: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            node_id: id,
            node_type: "llm".to_string(),
            node_name: "LLM".to_string(),
            node_input: input.into(),
            node_output: output.into(),
            chain_root_id: id,
            chain_id: id,
            step: 0,
            has_children: false,
            latency: Some(0),
            query_input_tokens: None,
            query_output_tokens: None,
            query_total_tokens: None,
            params: None,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Scorer selection for ingested chain rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptScorersConfig {
    #[serde(default, skip_serializing_if = "is_false")]
    pub latency: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub cost: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pii: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub toxicity: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub context_relevance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub uncertainty: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub factuality: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub groundedness: bool,
}

/// Runs API client.
pub struct RunsClient<'a> {
    client: &'a GalileoClient,
}

impl<'a> RunsClient<'a> {
    pub(crate) fn new(client: &'a GalileoClient) -> Self {
        Self { client }
    }

    /// Create a run in a project.
    pub async fn create(
        &self,
        project_id: &str,
        name: &str,
        task_type: &str,
    ) -> Result<Run, ObserveError> {
        let path = format!("/projects/{}/runs", project_id);
        let run: Run = self
            .client
            .http
            .post_json(&path, &json!({ "name": name, "task_type": task_type }))
            .await?;
        Ok(run)
    }

    /// Ingest chain rows into a run.
    pub async fn ingest_chains(
        &self,
        project_id: &str,
        run_id: &str,
        rows: &[ChainRow],
        scorers: &PromptScorersConfig,
    ) -> Result<(), ObserveError> {
        let path = format!("/projects/{}/runs/{}/chains/ingest", project_id, run_id);
        let body = json!({
            "rows": rows,
            "prompt_scorers_configuration": scorers,
        });
        self.client.http.post_json_no_content(&path, &body).await?;
        Ok(())
    }
}
