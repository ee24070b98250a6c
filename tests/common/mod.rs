#![allow(dead_code)]

use async_trait::async_trait;
use feedback_pipeline::config::{DataPaths, PipelineConfig};
use feedback_pipeline::error::{PipelineError, Result};
use feedback_pipeline::llm::{CompletionBackend, CompletionRequest};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const GENERATED_COMMENT: &str = "The bot just told me to call customer service.";

/// In-process completion backend answering from the kind of prompt it gets.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    /// Requests whose user message contains one of these fail.
    fail_on: Vec<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(request: &CompletionRequest) -> Value {
        if request.system.contains("\"feedback_comment_category\" field") {
            json!({"feedback_comment_category": "Redirect to Customer Service"})
        } else if request.system.contains("\"category\" and \"sub_category\"") {
            json!({"category": "payments and transfers", "sub_category": "Faster Payment System (FPS)"})
        } else {
            json!({"comment": GENERATED_COMMENT})
        }
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on.iter().any(|needle| request.user.contains(needle)) {
            return Err(PipelineError::Llm("scripted failure".to_string()));
        }
        Ok(Self::answer(request))
    }
}

pub const BASE_CSV: &str = "\
request_time,user_question,bot_answer,feedback_rating,feedback_comment
2025-06-03 09:00:00,What is FPS?,Please contact customer service.,THUMBS_DOWN,
2025-06-03 10:30:00,How do I open an account?,You can open one in the HSBC HK App.,THUMBS_UP,
2025-06-04 14:00:00,Which card has no annual fee?,We offer many cards.,THUMBS_DOWN,Too vague
";

pub fn write_base(paths: &DataPaths, contents: &str) {
    write_file(&paths.base, contents);
}

pub fn write_known_questions(paths: &DataPaths, questions: &[&str]) {
    let mut contents = String::from("question\n");
    for question in questions {
        contents.push_str(question);
        contents.push('\n');
    }
    write_file(&paths.mapped_questions, &contents);
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn config(dir: &Path, max_concurrent: usize) -> PipelineConfig {
    PipelineConfig::new(max_concurrent, Some(Duration::from_secs(5)), DataPaths::in_dir(dir)).unwrap()
}
