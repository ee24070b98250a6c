//! Feedback analysis report
//!
//! Reads the analyzed dataset, computes statistics and recommendations and
//! writes a markdown report.

pub mod analysis;
pub mod recommendations;
pub mod render;

pub use analysis::{analyze, FeedbackAnalysis};
pub use recommendations::generate_recommendations;
pub use render::{render_markdown, NO_DATA_REPORT};

use crate::config::DataPaths;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::store;
use crate::taxonomy;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Folds report-time aliases of failure categories; returns how many rows changed.
pub fn fold_failure_labels(dataset: &mut Dataset) -> usize {
    let mut folded = 0;
    for record in &mut dataset.records {
        if let Some(label) = record.feedback_comment_category.as_mut() {
            let report_label = taxonomy::report_failure_label(label).to_string();
            if report_label != *label {
                *label = report_label;
                folded += 1;
            }
        }
    }
    folded
}

/// Full markdown report for `dataset`, stamped with `generated_at`.
pub fn generate_report(dataset: &Dataset, generated_at: NaiveDateTime) -> String {
    match analyze(dataset) {
        Some(analysis) => {
            let recommendations = generate_recommendations(&analysis);
            render_markdown(&analysis, &recommendations, generated_at)
        }
        None => NO_DATA_REPORT.to_string(),
    }
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!("Report saved to: {}", path.display());
    Ok(())
}

pub struct ReportGenerator {
    data_file: PathBuf,
    output_file: PathBuf,
}

impl ReportGenerator {
    pub fn new(paths: &DataPaths) -> Self {
        Self {
            data_file: paths.analyzed.clone(),
            output_file: paths.report.clone(),
        }
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Loads the analyzed dataset; a missing file yields an empty dataset.
    pub fn load_data(&self) -> Result<Dataset> {
        if !self.data_file.exists() {
            error!("{} not found", self.data_file.display());
            return Ok(Dataset::default());
        }
        let mut dataset = store::load_dataset(&self.data_file)?;
        let folded = fold_failure_labels(&mut dataset);
        if folded > 0 {
            info!(
                "Merged {} '{}' records into '{}'",
                folded,
                taxonomy::CONVERSATION_STATELESSNESS,
                taxonomy::CONTEXTUAL_AWARENESS_FAILURE
            );
        }
        Ok(dataset)
    }

    pub fn generate_and_save(&self) -> Result<String> {
        info!("Generating comprehensive feedback analysis report...");
        let dataset = self.load_data()?;
        let report = generate_report(&dataset, Local::now().naive_local());
        save_report(&report, &self.output_file)?;
        Ok(report)
    }
}
