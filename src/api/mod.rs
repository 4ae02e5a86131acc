//! REST collaborators: scenario retrieval, AI chat, and validation.

mod client;
mod models;

pub use client::{ApiClient, ApiError, ApiResult};
pub use models::{ChatRequest, ChatResponse, Scenario, ScenarioId, ValidationResponse};
