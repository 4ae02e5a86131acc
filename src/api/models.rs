//! Request and response bodies of the scenario / chat API.

use serde::{Deserialize, Serialize};

pub type ScenarioId = i64;

/// A practice scenario shown next to the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    /// Some backends call this field `name`
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

/// Body of `POST /api/ai-chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(rename = "scenarioId")]
    pub scenario_id: Option<ScenarioId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Body returned by `POST /api/scenarios/{id}/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationResponse {
    pub message: String,
}
