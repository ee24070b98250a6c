//! Cross-file consolidator
//!
//! Builds the analyzed dataset from the base table and the four per-step
//! outputs. Annotation columns are joined by record identity, so an output
//! written in a different row order still lands on the right rows.

use crate::config::DataPaths;
use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::record::{
    FeedbackRecord, RecordIdentity, CATEGORY, FEEDBACK_COMMENT, FEEDBACK_COMMENT_CATEGORY, SCENARIO,
    SUB_CATEGORY,
};
use crate::store;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Comments,
    Categories,
    CommentCategories,
    Scenarios,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 4] = [
        AnnotationKind::Comments,
        AnnotationKind::Categories,
        AnnotationKind::CommentCategories,
        AnnotationKind::Scenarios,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnnotationKind::Comments => "comments",
            AnnotationKind::Categories => "categories",
            AnnotationKind::CommentCategories => "feedback comment categories",
            AnnotationKind::Scenarios => "scenarios",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            AnnotationKind::Comments => &[FEEDBACK_COMMENT],
            AnnotationKind::Categories => &[CATEGORY, SUB_CATEGORY],
            AnnotationKind::CommentCategories => &[FEEDBACK_COMMENT_CATEGORY],
            AnnotationKind::Scenarios => &[SCENARIO],
        }
    }

    pub fn output_path(&self, paths: &DataPaths) -> PathBuf {
        match self {
            AnnotationKind::Comments => paths.comments.clone(),
            AnnotationKind::Categories => paths.categories.clone(),
            AnnotationKind::CommentCategories => paths.comment_categories.clone(),
            AnnotationKind::Scenarios => paths.scenarios.clone(),
        }
    }

    fn copy_columns(&self, from: &FeedbackRecord, to: &mut FeedbackRecord) {
        match self {
            AnnotationKind::Comments => to.feedback_comment = from.feedback_comment.clone(),
            AnnotationKind::Categories => {
                to.category = from.category.clone();
                to.sub_category = from.sub_category.clone();
            }
            AnnotationKind::CommentCategories => {
                to.feedback_comment_category = from.feedback_comment_category.clone()
            }
            AnnotationKind::Scenarios => to.scenario = from.scenario,
        }
    }
}

/// One per-step output; `dataset` is `None` when the file does not exist.
#[derive(Debug, Clone)]
pub struct AnnotationOutput {
    pub kind: AnnotationKind,
    pub name: String,
    pub dataset: Option<Dataset>,
}

/// Loads every per-step output that exists on disk.
pub fn load_outputs(paths: &DataPaths) -> Result<Vec<AnnotationOutput>> {
    AnnotationKind::ALL
        .iter()
        .map(|&kind| {
            let path = kind.output_path(paths);
            let dataset = if path.exists() {
                info!("Loading {} from {}", kind.label(), path.display());
                Some(store::load_dataset(&path)?)
            } else {
                None
            };
            Ok(AnnotationOutput {
                kind,
                name: path.display().to_string(),
                dataset,
            })
        })
        .collect()
}

/// Copies each available output's columns onto a copy of `base`.
///
/// Fails with `PipelineError::Alignment` when a base identity is missing from
/// an output being applied.
pub fn consolidate(base: &Dataset, outputs: &[AnnotationOutput]) -> Result<Dataset> {
    let mut result = base.clone();

    for output in outputs {
        let Some(dataset) = &output.dataset else {
            warn!("{} file {} not found, skipping", output.kind.label(), output.name);
            continue;
        };

        let by_identity: HashMap<RecordIdentity, &FeedbackRecord> =
            dataset.iter().map(|r| (r.identity(), r)).collect();

        let missing: Vec<RecordIdentity> = result
            .identities()
            .filter(|identity| !by_identity.contains_key(identity))
            .collect();
        if let Some(first) = missing.first() {
            return Err(PipelineError::Alignment {
                output: output.name.clone(),
                missing: missing.len(),
                first_identity: first.to_string(),
            });
        }

        for record in &mut result.records {
            if let Some(source) = by_identity.get(&record.identity()) {
                output.kind.copy_columns(source, record);
            }
        }
        for &column in output.kind.columns() {
            result.mark_column(column);
        }
        info!("{} merged successfully", output.kind.label());
    }

    Ok(result)
}
