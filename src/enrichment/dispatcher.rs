//! Bounded concurrent enrichment dispatcher
//!
//! Runs one enrichment task over every record of a batch. All calls are
//! polled together on the current task and a semaphore caps how many are in
//! flight against the completion backend. A failing record only ever affects
//! its own result slot.

use crate::enrichment::EnrichmentTask;
use crate::error::PipelineError;
use crate::llm::CompletionBackend;
use crate::record::{FeedbackRecord, RecordIdentity};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Result for a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<O> {
    Completed(O),
    /// The call failed or the response was unusable; holds the reason.
    Failed(String),
    /// The record does not qualify for this task, no call was made.
    Skipped,
}

impl<O> TaskOutcome<O> {
    pub fn value(&self) -> Option<&O> {
        match self {
            TaskOutcome::Completed(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchStats {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug)]
pub struct EnrichmentOutcome<O> {
    /// One slot per input record, in input order.
    pub results: Vec<(RecordIdentity, TaskOutcome<O>)>,
    pub stats: DispatchStats,
    pub elapsed: Duration,
}

impl<O> EnrichmentOutcome<O> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub struct EnrichmentDispatcher<B: ?Sized> {
    backend: Arc<B>,
    concurrency_limit: usize,
    request_timeout: Option<Duration>,
}

impl<B: CompletionBackend + ?Sized> EnrichmentDispatcher<B> {
    pub fn new(backend: Arc<B>, concurrency_limit: usize) -> Self {
        Self {
            backend,
            concurrency_limit: concurrency_limit.clamp(1, Semaphore::MAX_PERMITS),
            request_timeout: None,
        }
    }

    pub fn with_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Runs `task` over `records`; returns once every record has a result.
    pub async fn enrich<T: EnrichmentTask>(
        &self,
        records: &[FeedbackRecord],
        task: &T,
    ) -> EnrichmentOutcome<T::Output> {
        info!(
            "Running {} over {} records (max {} concurrent calls)",
            task.name(),
            records.len(),
            self.concurrency_limit
        );

        let semaphore = Semaphore::new(self.concurrency_limit);
        let start = Instant::now();

        let calls = records
            .iter()
            .enumerate()
            .map(|(idx, record)| self.run_one(&semaphore, idx, record, task));
        let outcomes = join_all(calls).await;
        let elapsed = start.elapsed();

        let mut stats = DispatchStats::default();
        let results = records
            .iter()
            .zip(outcomes)
            .map(|(record, outcome)| {
                match &outcome {
                    TaskOutcome::Completed(_) => stats.succeeded += 1,
                    TaskOutcome::Failed(_) => stats.failed += 1,
                    TaskOutcome::Skipped => stats.skipped += 1,
                }
                (record.identity(), outcome)
            })
            .collect();

        info!(
            "Completed {} {} calls in {:.2} seconds ({} succeeded, {} failed, {} skipped)",
            stats.attempted(),
            task.name(),
            elapsed.as_secs_f64(),
            stats.succeeded,
            stats.failed,
            stats.skipped
        );

        EnrichmentOutcome {
            results,
            stats,
            elapsed,
        }
    }

    async fn run_one<T: EnrichmentTask>(
        &self,
        semaphore: &Semaphore,
        idx: usize,
        record: &FeedbackRecord,
        task: &T,
    ) -> TaskOutcome<T::Output> {
        if !task.applies_to(record) {
            return TaskOutcome::Skipped;
        }

        let _permit = match semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => return TaskOutcome::Failed(format!("Admission gate closed: {}", e)),
        };

        let request = task.build_request(record);
        let call = self.backend.complete(&request);
        let response = match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(response) => response,
                Err(_) => Err(PipelineError::Timeout(limit)),
            },
            None => call.await,
        };

        match response.and_then(|value| task.parse_response(&value)) {
            Ok(output) => TaskOutcome::Completed(output),
            Err(e) => {
                warn!("Error processing row {} ({}): {}", idx, task.name(), e);
                TaskOutcome::Failed(e.to_string())
            }
        }
    }
}
