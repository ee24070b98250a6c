mod common;

use common::ScriptedBackend;
use feedback_pipeline::enrichment::{
    CategoryClassification, CommentGeneration, EnrichmentDispatcher, EnrichmentTask, TaskOutcome,
};
use feedback_pipeline::record::{FeedbackRating, FeedbackRecord};
use std::sync::Arc;
use std::time::Duration;

fn records(n: usize, rating: FeedbackRating) -> Vec<FeedbackRecord> {
    (0..n)
        .map(|i| {
            FeedbackRecord::new(
                format!("2025-06-03 10:{:02}:00", i),
                format!("Question number {}", i),
                "Please contact customer service.",
                rating,
            )
        })
        .collect()
}

#[tokio::test]
async fn test_in_flight_calls_never_exceed_limit() {
    let backend = Arc::new(ScriptedBackend::new().with_delay(Duration::from_millis(20)));
    let dispatcher = EnrichmentDispatcher::new(backend.clone(), 3);

    let batch = records(12, FeedbackRating::ThumbsUp);
    let outcome = dispatcher.enrich(&batch, &CategoryClassification).await;

    assert_eq!(outcome.len(), 12);
    assert_eq!(outcome.stats.succeeded, 12);
    assert_eq!(backend.calls(), 12);
    assert!(backend.max_in_flight() <= 3, "max in flight {}", backend.max_in_flight());
    assert!(backend.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_one_failure_does_not_affect_other_records() {
    let backend = Arc::new(ScriptedBackend::new().failing_on("Question number 4"));
    let dispatcher = EnrichmentDispatcher::new(backend, 4);

    let batch = records(8, FeedbackRating::ThumbsUp);
    let outcome = dispatcher.enrich(&batch, &CategoryClassification).await;

    assert_eq!(outcome.len(), 8);
    assert_eq!(outcome.stats.succeeded, 7);
    assert_eq!(outcome.stats.failed, 1);
    for (idx, (identity, result)) in outcome.results.iter().enumerate() {
        assert_eq!(identity, &batch[idx].identity());
        if idx == 4 {
            assert!(result.is_failed());
        } else {
            assert_eq!(
                result.value().map(|a| a.category.as_str()),
                Some("Payments and transfers")
            );
        }
    }

    let mut failed = batch[4].clone();
    CategoryClassification.apply(&mut failed, &outcome.results[4].1);
    assert_eq!(failed.category.as_deref(), Some("other"));
    assert_eq!(failed.sub_category.as_deref(), Some("General"));
}

#[tokio::test]
async fn test_slow_call_times_out_as_failure() {
    let backend = Arc::new(ScriptedBackend::new().with_delay(Duration::from_millis(200)));
    let dispatcher =
        EnrichmentDispatcher::new(backend, 2).with_timeout(Some(Duration::from_millis(20)));

    let batch = records(2, FeedbackRating::ThumbsUp);
    let outcome = dispatcher.enrich(&batch, &CategoryClassification).await;

    assert_eq!(outcome.stats.failed, 2);
    for (_, result) in &outcome.results {
        match result {
            TaskOutcome::Failed(reason) => assert!(reason.contains("timed out after 20ms"), "{}", reason),
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_ineligible_records_are_skipped_without_calls() {
    let backend = Arc::new(ScriptedBackend::new());
    let dispatcher = EnrichmentDispatcher::new(backend.clone(), 2);

    let mut batch = records(2, FeedbackRating::ThumbsUp);
    batch.extend(records(1, FeedbackRating::ThumbsDown));
    batch.push(
        FeedbackRecord::new("2025-06-04 09:00:00", "Q", "A", FeedbackRating::ThumbsDown)
            .with_comment("Already said why"),
    );

    let outcome = dispatcher.enrich(&batch, &CommentGeneration).await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(outcome.stats.skipped, 3);
    assert_eq!(outcome.stats.succeeded, 1);
    assert_eq!(outcome.results[0].1, TaskOutcome::Skipped);
    assert!(matches!(outcome.results[2].1, TaskOutcome::Completed(_)));
}

#[tokio::test]
async fn test_empty_batch_makes_no_calls() {
    let backend = Arc::new(ScriptedBackend::new());
    let dispatcher = EnrichmentDispatcher::new(backend.clone(), 2);

    let outcome = dispatcher.enrich(&[], &CategoryClassification).await;
    assert!(outcome.is_empty());
    assert_eq!(backend.calls(), 0);
    assert_eq!(outcome.stats.attempted(), 0);
}

#[tokio::test]
async fn test_oversized_limit_is_capped_instead_of_panicking() {
    let backend = Arc::new(ScriptedBackend::new());
    let dispatcher = EnrichmentDispatcher::new(backend.clone(), usize::MAX);

    let batch = records(3, FeedbackRating::ThumbsUp);
    let outcome = dispatcher.enrich(&batch, &CategoryClassification).await;
    assert_eq!(outcome.stats.succeeded, 3);
    assert_eq!(backend.calls(), 3);
}
