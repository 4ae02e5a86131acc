//! HTTP client for the scenario, chat and validation collaborators.

use std::time::Duration;

use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::models::{ChatRequest, ChatResponse, Scenario, ScenarioId, ValidationResponse};

/// API-related errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error! status: {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Client for the learning-assistant REST API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an API path such as `/api/ai-chat`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/scenarios/{id}`
    pub async fn get_scenario(&self, id: ScenarioId) -> ApiResult<Scenario> {
        let url = self.endpoint(&format!("/api/scenarios/{}", id));
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        decode(response).await
    }

    /// `POST /api/ai-chat`, returning the assistant's reply.
    pub async fn chat(&self, message: &str, scenario_id: Option<ScenarioId>) -> ApiResult<String> {
        let url = self.endpoint("/api/ai-chat");
        debug!("POST {}", url);
        let body = ChatRequest { message, scenario_id };
        let response = self.http.post(&url).json(&body).send().await?;
        let reply: ChatResponse = decode(response).await?;
        Ok(reply.response)
    }

    /// `POST /api/scenarios/{id}/validate`, returning the verdict message.
    pub async fn validate(&self, id: ScenarioId) -> ApiResult<String> {
        let url = self.endpoint(&format!("/api/scenarios/{}/validate", id));
        debug!("POST {}", url);
        let response = self.http.post(&url).send().await?;
        let verdict: ValidationResponse = decode(response).await?;
        Ok(verdict.message)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status { status, body });
    }
    Ok(serde_json::from_str(&body)?)
}
