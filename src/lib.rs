pub mod config;
pub mod consolidate;
pub mod convert;
pub mod dataset;
pub mod enrichment;
pub mod error;
pub mod filter;
pub mod llm;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod scenario;
pub mod store;
pub mod summary;
pub mod taxonomy;

pub use config::{DataPaths, LlmSettings, PipelineConfig};
pub use dataset::Dataset;
pub use error::{PipelineError, Result};
pub use llm::{CompletionBackend, CompletionRequest, LlmClient};
pub use pipeline::{FeedbackPipeline, StepOutcome, StepReport};
pub use record::{FeedbackRating, FeedbackRecord, RecordIdentity, Scenario};
