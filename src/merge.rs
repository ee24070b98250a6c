//! Incremental merge engine
//!
//! Appends a freshly annotated batch to a prior output and compacts it by
//! record identity. Prior rows come first, so the newest row for an identity
//! is always the one that survives.

use crate::dataset::Dataset;
use crate::record::RecordIdentity;
use std::collections::HashMap;
use tracing::info;

/// Merges `new_batch` into `prior`, last occurrence of each identity wins.
pub fn merge(new_batch: Dataset, prior: Option<Dataset>) -> Dataset {
    let Some(mut combined) = prior else {
        return new_batch;
    };

    info!(
        "Merging {} new records with {} existing records",
        new_batch.len(),
        combined.len()
    );
    combined.append(new_batch);
    let merged = dedup_keep_last(combined);
    info!("Final merged dataset contains {} records", merged.len());
    merged
}

/// Drops every row whose identity occurs again later in the table.
pub fn dedup_keep_last(mut dataset: Dataset) -> Dataset {
    let identities: Vec<RecordIdentity> = dataset.identities().collect();
    let mut last_seen: HashMap<&RecordIdentity, usize> = HashMap::with_capacity(identities.len());
    for (idx, identity) in identities.iter().enumerate() {
        last_seen.insert(identity, idx);
    }

    let mut idx = 0;
    dataset.records.retain(|_| {
        let keep = last_seen.get(&identities[idx]) == Some(&idx);
        idx += 1;
        keep
    });
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FeedbackRating, FeedbackRecord};

    fn rec(time: &str, category: &str) -> FeedbackRecord {
        let mut r = FeedbackRecord::new(time, "question", "answer", FeedbackRating::ThumbsUp);
        r.category = Some(category.to_string());
        r
    }

    fn categories(ds: &Dataset) -> Vec<(String, String)> {
        ds.iter()
            .map(|r| (r.request_time.clone(), r.category.clone().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_without_prior_returns_batch_unchanged() {
        let batch = Dataset::new(vec![rec("t1", "Loans"), rec("t1", "Loans")]);
        assert_eq!(merge(batch.clone(), None), batch);
    }

    #[test]
    fn test_new_value_wins_over_old() {
        let prior = Dataset::new(vec![rec("x", "old"), rec("y", "kept")]);
        let batch = Dataset::new(vec![rec("x", "new")]);

        let merged = merge(batch, Some(prior));
        assert_eq!(
            categories(&merged),
            vec![
                ("y".to_string(), "kept".to_string()),
                ("x".to_string(), "new".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_is_idempotent_for_same_batch() {
        let prior = Dataset::new(vec![rec("a", "Loans"), rec("b", "MPF")]);
        let once = merge(prior.clone(), Some(prior.clone()));
        let twice = merge(prior.clone(), Some(once.clone()));
        assert_eq!(once.len(), 2);
        assert_eq!(categories(&once), categories(&twice));
    }

    #[test]
    fn test_pipes_in_text_keep_records_apart() {
        let a = FeedbackRecord::new("t", "a|b", "c", FeedbackRating::ThumbsUp);
        let b = FeedbackRecord::new("t", "a", "b|c", FeedbackRating::ThumbsUp);

        let merged = merge(Dataset::new(vec![b.clone()]), Some(Dataset::new(vec![a.clone()])));
        assert_eq!(merged.records, vec![a, b]);
    }

    #[test]
    fn test_duplicates_inside_prior_are_compacted() {
        let prior = Dataset::new(vec![rec("a", "first"), rec("a", "second"), rec("b", "MPF")]);
        let merged = merge(Dataset::new(vec![rec("c", "Loans")]), Some(prior));
        assert_eq!(
            categories(&merged),
            vec![
                ("a".to_string(), "second".to_string()),
                ("b".to_string(), "MPF".to_string()),
                ("c".to_string(), "Loans".to_string()),
            ]
        );
    }
}
