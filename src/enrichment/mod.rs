//! LLM-backed enrichment of feedback records.

pub mod dispatcher;
pub mod tasks;

pub use dispatcher::{DispatchStats, EnrichmentDispatcher, EnrichmentOutcome, TaskOutcome};
pub use tasks::{CategoryAssignment, CategoryClassification, CommentFailureClassification, CommentGeneration};

use crate::error::Result;
use crate::llm::CompletionRequest;
use crate::record::FeedbackRecord;
use serde_json::Value;

/// One kind of annotation computed per record through the completion backend.
pub trait EnrichmentTask {
    type Output;

    fn name(&self) -> &'static str;

    /// Columns this task writes on the output dataset.
    fn output_columns(&self) -> &'static [&'static str];

    /// Records that fail this predicate are never sent to the backend.
    fn applies_to(&self, record: &FeedbackRecord) -> bool;

    fn build_request(&self, record: &FeedbackRecord) -> CompletionRequest;

    /// Extracts the annotation from the backend's JSON object. Any error is
    /// treated as a failed call for that record.
    fn parse_response(&self, response: &Value) -> Result<Self::Output>;

    /// Writes an outcome onto the record it was computed for.
    fn apply(&self, record: &mut FeedbackRecord, outcome: &TaskOutcome<Self::Output>);
}
