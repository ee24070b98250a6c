//! Unprocessed-record filter
//!
//! Selects the rows of a dataset whose identity is not yet present in a
//! previously written output, so each run only annotates new records.

use crate::dataset::Dataset;
use crate::record::RecordIdentity;
use std::collections::HashSet;
use tracing::info;

/// Rows still needing annotation, with their positions in the source dataset.
#[derive(Debug, Clone)]
pub struct UnprocessedSubset {
    pub indices: Vec<usize>,
    pub dataset: Dataset,
}

impl UnprocessedSubset {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub fn processed_identities(prior: &Dataset) -> HashSet<RecordIdentity> {
    prior.identities().collect()
}

/// Filters `current` against an in-memory prior output.
pub fn filter_against(current: &Dataset, prior: Option<&Dataset>) -> UnprocessedSubset {
    let processed = prior.map(processed_identities).unwrap_or_default();

    if processed.is_empty() {
        info!("No previously processed records found, processing all records");
        return UnprocessedSubset {
            indices: (0..current.len()).collect(),
            dataset: current.clone(),
        };
    }

    let indices: Vec<usize> = current
        .iter()
        .enumerate()
        .filter(|(_, record)| !processed.contains(&record.identity()))
        .map(|(idx, _)| idx)
        .collect();

    info!(
        "Found {} new/unprocessed records out of {} total records",
        indices.len(),
        current.len()
    );

    UnprocessedSubset {
        dataset: current.subset(&indices),
        indices,
    }
}
