mod common;

use common::{config, write_base, write_file, write_known_questions, ScriptedBackend, BASE_CSV, GENERATED_COMMENT};
use feedback_pipeline::error::PipelineError;
use feedback_pipeline::pipeline::FeedbackPipeline;
use feedback_pipeline::record::Scenario;
use feedback_pipeline::store;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn test_full_run_annotates_three_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 4);
    write_base(&config.paths, BASE_CSV);
    write_known_questions(&config.paths, &["what is fps"]);

    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = FeedbackPipeline::new(config.clone(), Some(backend.clone()));
    let steps = pipeline.run_full().await.unwrap();
    assert_eq!(steps.len(), 5);
    assert!(steps.iter().all(|s| s.save_error.is_none()));
    assert!(steps.iter().all(|s| s.report.run_id == pipeline.run_id()));

    // 1 comment + 3 categories + 2 comment categories
    assert_eq!(backend.calls(), 6);

    let analyzed = store::load_dataset(&config.paths.analyzed).unwrap();
    assert_eq!(analyzed.len(), 3);
    let rows = &analyzed.records;

    assert_eq!(rows[0].feedback_comment.as_deref(), Some(GENERATED_COMMENT));
    assert_eq!(rows[0].category.as_deref(), Some("Payments and transfers"));
    assert_eq!(rows[0].sub_category.as_deref(), Some("Faster Payment System (FPS)"));
    assert_eq!(rows[0].feedback_comment_category.as_deref(), Some("Redirect to Customer Service"));
    assert_eq!(rows[0].scenario, Some(Scenario::A));

    assert_eq!(rows[1].feedback_comment, None);
    assert!(rows[1].category.is_some());
    assert_eq!(rows[1].feedback_comment_category, None);
    assert_eq!(rows[1].scenario, Some(Scenario::B));

    assert_eq!(rows[2].feedback_comment.as_deref(), Some("Too vague"));
    assert!(rows[2].category.is_some());
    assert_eq!(rows[2].feedback_comment_category.as_deref(), Some("Redirect to Customer Service"));
    assert_eq!(rows[2].scenario, Some(Scenario::B));

    assert!(config.paths.analyzed.with_extension("xlsx").exists());
    assert!(config.paths.comments.with_extension("xlsx").exists());
}

#[tokio::test]
async fn test_second_run_is_idempotent_and_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 4);
    write_base(&config.paths, BASE_CSV);
    write_known_questions(&config.paths, &["what is fps"]);

    let first = Arc::new(ScriptedBackend::new());
    FeedbackPipeline::new(config.clone(), Some(first.clone()))
        .run_full()
        .await
        .unwrap();
    let analyzed_before = fs::read_to_string(&config.paths.analyzed).unwrap();

    let second = Arc::new(ScriptedBackend::new());
    let steps = FeedbackPipeline::new(config.clone(), Some(second.clone()))
        .run_full()
        .await
        .unwrap();

    assert_eq!(second.calls(), 0);
    for step in &steps[..4] {
        assert_eq!(step.report.unprocessed, 0, "step {}", step.report.step);
    }
    assert_eq!(fs::read_to_string(&config.paths.analyzed).unwrap(), analyzed_before);
}

#[tokio::test]
async fn test_new_base_rows_are_the_only_ones_processed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 4);
    write_base(&config.paths, BASE_CSV);

    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = FeedbackPipeline::new(config.clone(), Some(backend.clone()));
    pipeline.process_categories().await.unwrap();
    assert_eq!(backend.calls(), 3);

    let grown = format!("{}2025-06-05 08:00:00,Where is my nearest branch?,Use the branch locator.,THUMBS_UP,\n", BASE_CSV);
    write_base(&config.paths, &grown);

    let outcome = pipeline.process_categories().await.unwrap();
    assert_eq!(backend.calls(), 4);
    assert_eq!(outcome.report.unprocessed, 1);
    assert_eq!(outcome.dataset.len(), 4);
    assert!(outcome.dataset.iter().all(|r| r.category.is_some()));
}

#[tokio::test]
async fn test_thumbs_up_rows_never_reach_comment_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    write_base(&config.paths, BASE_CSV);

    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = FeedbackPipeline::new(config.clone(), Some(backend.clone()));
    let comments = pipeline.process_comments().await.unwrap();
    let failures = pipeline.process_comment_categories().await.unwrap();

    assert_eq!(comments.report.stats.skipped, 2);
    assert_eq!(failures.report.stats.skipped, 1);
    assert!(backend
        .requests()
        .iter()
        .all(|r| !r.user.contains("How do I open an account?")));
    assert_eq!(failures.dataset.records[1].feedback_comment, None);
    assert_eq!(failures.dataset.records[1].feedback_comment_category, None);
}

#[tokio::test]
async fn test_failed_category_call_gets_fallback_pair() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 3);
    write_base(&config.paths, BASE_CSV);

    let backend = Arc::new(ScriptedBackend::new().failing_on("Which card has no annual fee?"));
    let pipeline = FeedbackPipeline::new(config, Some(backend));
    let outcome = pipeline.process_categories().await.unwrap();

    assert_eq!(outcome.report.stats.succeeded, 2);
    assert_eq!(outcome.report.stats.failed, 1);
    let failed = &outcome.dataset.records[2];
    assert_eq!(failed.category.as_deref(), Some("other"));
    assert_eq!(failed.sub_category.as_deref(), Some("General"));
}

#[tokio::test]
async fn test_comment_categories_require_comments_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    write_base(&config.paths, BASE_CSV);

    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = FeedbackPipeline::new(config.clone(), Some(backend.clone()));
    let outcome = pipeline.process_comment_categories().await.unwrap();

    assert!(outcome.dataset.is_empty());
    assert!(outcome.report.note.unwrap().contains("run comments first"));
    assert_eq!(backend.calls(), 0);
    assert!(!config.paths.comment_categories.exists());
}

#[tokio::test]
async fn test_llm_steps_need_a_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    write_base(&config.paths, BASE_CSV);

    let pipeline = FeedbackPipeline::<ScriptedBackend>::new(config, None);
    assert!(matches!(pipeline.process_comments().await, Err(PipelineError::Config(_))));
    // Scenario tagging is local and still works.
    let scenarios = pipeline.process_scenarios().unwrap();
    assert_eq!(scenarios.dataset.len(), 3);
    assert!(scenarios.dataset.iter().all(|r| r.scenario == Some(Scenario::B)));
}

#[tokio::test]
async fn test_merge_rejects_outputs_missing_base_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    write_base(&config.paths, BASE_CSV);

    let pipeline = FeedbackPipeline::<ScriptedBackend>::new(config.clone(), None);
    pipeline.process_scenarios().unwrap();

    // A base row appears that the scenarios output has never seen.
    let grown = format!("{}2025-06-05 08:00:00,Hi,Hello,THUMBS_UP,\n", BASE_CSV);
    write_base(&config.paths, &grown);

    match pipeline.merge_files() {
        Err(PipelineError::Alignment { missing, first_identity, .. }) => {
            assert_eq!(missing, 1);
            assert_eq!(first_identity, "2025-06-05 08:00:00|Hi|Hello");
        }
        other => panic!("expected alignment error, got {:?}", other.map(|o| o.report)),
    }
}

#[tokio::test]
async fn test_missing_base_column_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    write_file(
        &config.paths.base,
        "request_time,user_question,feedback_rating\n2025-06-03,Hi,THUMBS_UP\n",
    );

    let pipeline = FeedbackPipeline::new(config, Some(Arc::new(ScriptedBackend::new())));
    assert!(matches!(pipeline.process_categories().await, Err(PipelineError::Schema(_))));
}

#[tokio::test]
async fn test_save_failure_still_returns_merged_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    write_base(&config.paths, BASE_CSV);
    // A directory where the output file should go makes the write fail.
    fs::create_dir_all(&config.paths.scenarios).unwrap();

    let pipeline = FeedbackPipeline::<ScriptedBackend>::new(config, None);
    let outcome = pipeline.process_scenarios().unwrap();
    assert!(outcome.save_error.is_some());
    assert_eq!(outcome.dataset.len(), 3);
    assert!(outcome.dataset.iter().all(|r| r.scenario.is_some()));
}
