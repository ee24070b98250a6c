//! Feedback Pipeline - incremental enrichment steps
//!
//! Each step loads its source table, keeps only the records its own output
//! has not seen yet, annotates them, merges the batch into the prior output
//! and writes the result back. A second run over an unchanged base makes no
//! completion calls at all.

use crate::config::PipelineConfig;
use crate::consolidate;
use crate::dataset::Dataset;
use crate::enrichment::{
    CategoryClassification, CommentFailureClassification, CommentGeneration, DispatchStats,
    EnrichmentDispatcher, EnrichmentTask,
};
use crate::error::{PipelineError, Result};
use crate::filter;
use crate::llm::CompletionBackend;
use crate::merge;
use crate::record::SCENARIO;
use crate::scenario;
use crate::store;
use crate::summary;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const STEP_COMMENTS: &str = "comments";
pub const STEP_CATEGORIES: &str = "categories";
pub const STEP_COMMENT_CATEGORIES: &str = "comment-categories";
pub const STEP_SCENARIOS: &str = "scenarios";
pub const STEP_MERGE: &str = "merge";

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub run_id: Uuid,
    pub step: &'static str,
    /// Records in the step's source table.
    pub total_records: usize,
    /// Records the step actually annotated in this run.
    pub unprocessed: usize,
    pub stats: DispatchStats,
    pub output: PathBuf,
    pub note: Option<String>,
}

impl StepReport {
    fn new(run_id: Uuid, step: &'static str, output: &Path) -> Self {
        Self {
            run_id,
            step,
            total_records: 0,
            unprocessed: 0,
            stats: DispatchStats::default(),
            output: output.to_path_buf(),
            note: None,
        }
    }
}

/// Result of one step. A failed write does not lose the merged dataset.
#[derive(Debug)]
pub struct StepOutcome {
    pub dataset: Dataset,
    pub report: StepReport,
    pub save_error: Option<PipelineError>,
}

impl StepOutcome {
    fn unsaved(dataset: Dataset, report: StepReport) -> Self {
        Self {
            dataset,
            report,
            save_error: None,
        }
    }

    fn saved(dataset: Dataset, report: StepReport) -> Self {
        let save_error = store::save_dataset(&dataset, &report.output).err();
        if let Some(ref e) = save_error {
            error!("Error saving results to {}: {}", report.output.display(), e);
        }
        Self {
            dataset,
            report,
            save_error,
        }
    }
}

pub struct FeedbackPipeline<B: ?Sized> {
    config: PipelineConfig,
    dispatcher: Option<EnrichmentDispatcher<B>>,
    run_id: Uuid,
}

impl<B: CompletionBackend + ?Sized> FeedbackPipeline<B> {
    /// `backend` may be `None` for runs that only tag scenarios, merge or
    /// report; the LLM steps then fail with a configuration error.
    pub fn new(config: PipelineConfig, backend: Option<Arc<B>>) -> Self {
        let dispatcher = backend.map(|backend| {
            EnrichmentDispatcher::new(backend, config.max_concurrent_requests)
                .with_timeout(config.request_timeout)
        });
        Self {
            config,
            dispatcher,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn dispatcher(&self) -> Result<&EnrichmentDispatcher<B>> {
        self.dispatcher.as_ref().ok_or_else(|| {
            PipelineError::Config(
                "API key is required. Set DEEPSEEK_API_KEY in .env or pass --api-key".to_string(),
            )
        })
    }

    /// Loads the base table; a missing file yields `None`.
    fn load_base(&self) -> Result<Option<Dataset>> {
        let path = &self.config.paths.base;
        if !path.exists() {
            error!("{} not found", path.display());
            return Ok(None);
        }
        store::load_dataset(path).map(Some)
    }

    fn missing_source(&self, step: &'static str, output: &Path, note: String) -> StepOutcome {
        let mut report = StepReport::new(self.run_id, step, output);
        report.note = Some(note);
        StepOutcome::unsaved(Dataset::default(), report)
    }

    /// Generates comments for THUMBS_DOWN rows without one.
    pub async fn process_comments(&self) -> Result<StepOutcome> {
        info!("=== PROCESSING COMMENTS ONLY ===");
        let output = self.config.paths.comments.clone();
        let dispatcher = self.dispatcher()?;
        let Some(base) = self.load_base()? else {
            return Ok(self.missing_source(STEP_COMMENTS, &output, "base feedback file not found".to_string()));
        };
        self.enrichment_step(STEP_COMMENTS, base, &output, dispatcher, &CommentGeneration)
            .await
    }

    /// Classifies every row onto the category tree.
    pub async fn process_categories(&self) -> Result<StepOutcome> {
        info!("=== PROCESSING CATEGORIES ONLY ===");
        let output = self.config.paths.categories.clone();
        let dispatcher = self.dispatcher()?;
        let Some(base) = self.load_base()? else {
            return Ok(self.missing_source(STEP_CATEGORIES, &output, "base feedback file not found".to_string()));
        };
        self.enrichment_step(STEP_CATEGORIES, base, &output, dispatcher, &CategoryClassification)
            .await
    }

    /// Labels the failure mode of THUMBS_DOWN comments. Reads the comments
    /// output so generated comments are classified too.
    pub async fn process_comment_categories(&self) -> Result<StepOutcome> {
        info!("=== ADDING FEEDBACK COMMENT CATEGORIES ===");
        let output = self.config.paths.comment_categories.clone();
        let dispatcher = self.dispatcher()?;
        let comments_path = &self.config.paths.comments;
        if !comments_path.exists() {
            error!(
                "Comments file {} not found. Please run the comments step first.",
                comments_path.display()
            );
            return Ok(self.missing_source(
                STEP_COMMENT_CATEGORIES,
                &output,
                "comments output not found, run comments first".to_string(),
            ));
        }
        let source = store::load_dataset(comments_path)?;
        info!("Loaded {} records with comments", source.len());
        self.enrichment_step(
            STEP_COMMENT_CATEGORIES,
            source,
            &output,
            dispatcher,
            &CommentFailureClassification,
        )
        .await
    }

    /// Tags provided (A) and open-ended (B) questions. No completion calls.
    pub fn process_scenarios(&self) -> Result<StepOutcome> {
        info!("=== PROCESSING SCENARIOS ONLY ===");
        let output = self.config.paths.scenarios.clone();
        let Some(base) = self.load_base()? else {
            return Ok(self.missing_source(STEP_SCENARIOS, &output, "base feedback file not found".to_string()));
        };

        let prior = store::load_prior_output(&output);
        let subset = filter::filter_against(&base, prior.as_ref());
        let mut report = StepReport::new(self.run_id, STEP_SCENARIOS, &output);
        report.total_records = base.len();
        report.unprocessed = subset.len();

        if subset.is_empty() {
            info!("No new records to process for scenarios");
            return Ok(StepOutcome::unsaved(prior.unwrap_or(base), report));
        }

        let known_questions = scenario::load_known_questions(&self.config.paths.mapped_questions);
        let mut batch = subset.dataset;
        batch.mark_column(SCENARIO);
        scenario::tag_scenarios(&mut batch.records, &known_questions);

        let merged = merge::merge(batch, prior);
        Ok(StepOutcome::saved(merged, report))
    }

    /// Consolidates the per-step outputs onto the base table and writes the
    /// analyzed file.
    pub fn merge_files(&self) -> Result<StepOutcome> {
        info!("=== MERGING FILES ===");
        let output = self.config.paths.analyzed.clone();
        let Some(base) = self.load_base()? else {
            return Ok(self.missing_source(STEP_MERGE, &output, "base feedback file not found".to_string()));
        };

        let outputs = consolidate::load_outputs(&self.config.paths)?;
        let analyzed = consolidate::consolidate(&base, &outputs)?;

        let mut report = StepReport::new(self.run_id, STEP_MERGE, &output);
        report.total_records = analyzed.len();
        Ok(StepOutcome::saved(analyzed, report))
    }

    /// Runs every step in order, consolidates and logs a summary. Stops after
    /// the comments step when there is no base data.
    pub async fn run_full(&self) -> Result<Vec<StepOutcome>> {
        info!("=== RUNNING FULL ANALYSIS (run {}) ===", self.run_id);
        let mut steps = Vec::with_capacity(5);

        info!("Step 1: Processing comments...");
        let comments = self.process_comments().await?;
        let no_data = comments.dataset.is_empty();
        steps.push(comments);
        if no_data {
            warn!("No feedback records available, stopping");
            return Ok(steps);
        }

        info!("Step 2: Processing categories...");
        steps.push(self.process_categories().await?);

        info!("Step 3: Processing feedback comment categories...");
        steps.push(self.process_comment_categories().await?);

        info!("Step 4: Processing scenarios...");
        steps.push(self.process_scenarios()?);

        info!("Step 5: Merging all processed files...");
        let merged = self.merge_files()?;
        summary::summarize(&merged.dataset).log();
        steps.push(merged);

        Ok(steps)
    }

    async fn enrichment_step<T: EnrichmentTask>(
        &self,
        step: &'static str,
        source: Dataset,
        output: &Path,
        dispatcher: &EnrichmentDispatcher<B>,
        task: &T,
    ) -> Result<StepOutcome> {
        let prior = store::load_prior_output(output);
        let subset = filter::filter_against(&source, prior.as_ref());

        let mut report = StepReport::new(self.run_id, step, output);
        report.total_records = source.len();
        report.unprocessed = subset.len();

        if subset.is_empty() {
            info!("No new records to process for {}", step);
            return Ok(StepOutcome::unsaved(prior.unwrap_or(source), report));
        }

        let mut batch = subset.dataset;
        for &column in task.output_columns() {
            batch.mark_column(column);
        }

        let outcome = dispatcher.enrich(&batch.records, task).await;
        report.stats = outcome.stats;
        for (record, (_, result)) in batch.records.iter_mut().zip(outcome.results.iter()) {
            task.apply(record, result);
        }
        info!(
            "Successfully completed {} of {} {} calls",
            outcome.stats.succeeded,
            outcome.stats.attempted(),
            task.name()
        );

        let merged = merge::merge(batch, prior);
        Ok(StepOutcome::saved(merged, report))
    }
}
