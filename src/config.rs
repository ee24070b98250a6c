//! Pipeline configuration
//!
//! Built once at startup from the environment (after `.env` is loaded) and
//! passed by reference to every component.

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Locations of every dataset the pipeline reads or writes.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub base: PathBuf,
    pub comments: PathBuf,
    pub categories: PathBuf,
    pub comment_categories: PathBuf,
    pub scenarios: PathBuf,
    pub mapped_questions: PathBuf,
    pub analyzed: PathBuf,
    pub report: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            base: dir.join("pws_chatbot_qa_feedbacks.csv"),
            comments: dir.join("pws_chatbot_qa_feedbacks_with_comments.csv"),
            categories: dir.join("pws_chatbot_qa_feedbacks_with_categories.csv"),
            comment_categories: dir.join("pws_chatbot_qa_feedbacks_with_comment_categories.csv"),
            scenarios: dir.join("pws_chatbot_qa_feedbacks_with_scenarios.csv"),
            mapped_questions: dir.join("mapped_questions.csv"),
            analyzed: dir.join("pws_chatbot_qa_feedbacks_analyzed.csv"),
            report: dir.join("feedback_analysis_report.md"),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

/// Connection settings for the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmSettings {
    /// Reads `DEEPSEEK_API_KEY`, `DEEPSEEK_BASE_URL` and `DEEPSEEK_MODEL`.
    /// A missing key is a configuration error.
    pub fn from_env(api_key_override: Option<String>) -> Result<Self> {
        let api_key = api_key_override
            .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Config(
                    "API key is required. Set DEEPSEEK_API_KEY in .env or pass --api-key".to_string(),
                )
            })?;

        Ok(Self {
            api_key,
            base_url: std::env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub max_concurrent_requests: usize,
    pub request_timeout: Option<Duration>,
    pub paths: DataPaths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            paths: DataPaths::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(max_concurrent_requests: usize, request_timeout: Option<Duration>, paths: DataPaths) -> Result<Self> {
        if max_concurrent_requests == 0 {
            return Err(PipelineError::Config(
                "max concurrent requests must be at least 1".to_string(),
            ));
        }
        if max_concurrent_requests > Semaphore::MAX_PERMITS {
            return Err(PipelineError::Config(format!(
                "max concurrent requests must be at most {}, got {}",
                Semaphore::MAX_PERMITS,
                max_concurrent_requests
            )));
        }
        Ok(Self {
            max_concurrent_requests,
            request_timeout,
            paths,
        })
    }

    /// Reads `MAX_CONCURRENT_REQUESTS`, `LLM_REQUEST_TIMEOUT_SECS` (0 disables
    /// the timeout) and `FEEDBACK_DATA_DIR`.
    pub fn from_env() -> Result<Self> {
        let max_concurrent = env_number("MAX_CONCURRENT_REQUESTS", DEFAULT_MAX_CONCURRENT_REQUESTS as u64)?;
        let max_concurrent = usize::try_from(max_concurrent).map_err(|_| {
            PipelineError::Config(format!("MAX_CONCURRENT_REQUESTS is too large: {}", max_concurrent))
        })?;
        let timeout_secs = env_number("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let data_dir = std::env::var("FEEDBACK_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        Self::new(
            max_concurrent,
            (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            DataPaths::in_dir(data_dir),
        )
    }
}

fn env_number(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PipelineError::Config(format!("{} must be a non-negative integer, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
