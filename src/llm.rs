use crate::config::LlmSettings;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One chat-completion call: system instructions plus user content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// The external text-generation capability. Returns the parsed JSON object
/// the model answered with, or an error for anything else.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value>;
}

#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::new(
            settings.api_key.clone(),
            settings.model.clone(),
            settings.base_url.clone(),
        )
    }

    async fn call_llm(&self, request: &CompletionRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user}
            ],
            "response_format": {"type": "json_object"}
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Llm(format!("LLM API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Llm(format!(
                "LLM API returned {}: {}",
                status, text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| PipelineError::Llm("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value> {
        let content = self.call_llm(request).await?;
        debug!("LLM response: {}", content);
        parse_json_object(&content)
    }
}

/// Parses model output as a JSON object, tolerating markdown code fences.
pub fn parse_json_object(content: &str) -> Result<Value> {
    let cleaned = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        PipelineError::Llm(format!("Failed to parse LLM response: {}. Response: {}", e, cleaned))
    })?;

    if !value.is_object() {
        return Err(PipelineError::Llm(format!(
            "Expected a JSON object, got: {}",
            cleaned
        )));
    }
    Ok(value)
}

/// Reads a required string field out of a response object.
pub fn required_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PipelineError::Llm(format!("Response is missing the '{}' field", field)))
}
