//! The three enrichment tasks: comment generation, category classification
//! and comment-failure classification.

use crate::enrichment::{EnrichmentTask, TaskOutcome};
use crate::error::{PipelineError, Result};
use crate::llm::{required_str, CompletionRequest};
use crate::record::{FeedbackRecord, CATEGORY, FEEDBACK_COMMENT, FEEDBACK_COMMENT_CATEGORY, SUB_CATEGORY};
use crate::taxonomy::{self, GENERAL, OTHER_CATEGORY};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref CATEGORY_SYSTEM_PROMPT: String = format!(
        r#"You are an expert at categorizing banking and financial service questions based on HSBC's website structure.

Based on the user question and bot answer, categorize the question according to this sitemap structure:

{}
Return the response in JSON format with "category" and "sub_category" fields containing the appropriate level 1 and level 2 category names respectively.
If no specific sub-category applies, return "General" for the sub_category field."#,
        taxonomy::render_category_tree()
    );
    static ref FAILURE_SYSTEM_PROMPT: String = format!(
        r#"You are an expert at categorizing feedback comments for a banking chatbot.

Based on the feedback comment, categorize it into one of the following categories:

{}
If no category is matching return "General".

Return the response in JSON format with a "feedback_comment_category" field containing the most appropriate category."#,
        taxonomy::render_failure_taxonomy()
    );
}

const COMMENT_SYSTEM_PROMPT: &str = r#"You are an AI assistant that analyzes chatbot interactions to generate feedback comments.

Given a user question and bot answer that received a THUMBS_DOWN rating,
generate a realistic feedback comment that explains why the user might have given a negative rating.

Focus on what might be wrong with the answer:
- Unhelpful or vague responses
- Incorrect information
- Not addressing the user's specific question
- Directing to customer service instead of providing useful information
- Missing important details

Keep the comment concise (1-2 sentences) and realistic as if written by a frustrated user.

Return the response in JSON format with a "comment" field."#;

/// Writes a synthetic negative comment for THUMBS_DOWN rows left without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentGeneration;

impl EnrichmentTask for CommentGeneration {
    type Output = String;

    fn name(&self) -> &'static str {
        "comment generation"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[FEEDBACK_COMMENT]
    }

    fn applies_to(&self, record: &FeedbackRecord) -> bool {
        record.is_thumbs_down() && record.has_blank_comment()
    }

    fn build_request(&self, record: &FeedbackRecord) -> CompletionRequest {
        CompletionRequest::new(
            COMMENT_SYSTEM_PROMPT,
            format!(
                "User Question: {}\nBot Answer: {}\n\nGenerate an appropriate negative feedback comment explaining why this answer deserves a THUMBS_DOWN.",
                record.user_question, record.bot_answer
            ),
        )
    }

    fn parse_response(&self, response: &Value) -> Result<String> {
        let comment = required_str(response, "comment")?.trim();
        if comment.is_empty() {
            return Err(PipelineError::Llm("Generated comment is empty".to_string()));
        }
        Ok(comment.to_string())
    }

    fn apply(&self, record: &mut FeedbackRecord, outcome: &TaskOutcome<String>) {
        if let TaskOutcome::Completed(comment) = outcome {
            record.feedback_comment = Some(comment.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub category: String,
    pub sub_category: String,
}

impl CategoryAssignment {
    pub fn fallback() -> Self {
        Self {
            category: OTHER_CATEGORY.to_string(),
            sub_category: GENERAL.to_string(),
        }
    }
}

/// Places every question on the two-level site taxonomy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryClassification;

impl EnrichmentTask for CategoryClassification {
    type Output = CategoryAssignment;

    fn name(&self) -> &'static str {
        "categorization"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[CATEGORY, SUB_CATEGORY]
    }

    fn applies_to(&self, _record: &FeedbackRecord) -> bool {
        true
    }

    fn build_request(&self, record: &FeedbackRecord) -> CompletionRequest {
        CompletionRequest::new(
            CATEGORY_SYSTEM_PROMPT.as_str(),
            format!(
                "User Question: {}\nBot Answer: {}\n\nCategorize this question.",
                record.user_question, record.bot_answer
            ),
        )
    }

    fn parse_response(&self, response: &Value) -> Result<CategoryAssignment> {
        let category = required_str(response, "category")?;
        let sub_category = required_str(response, "sub_category")?;
        let (category, sub_category) = taxonomy::resolve_category(category, sub_category);
        Ok(CategoryAssignment {
            category,
            sub_category,
        })
    }

    fn apply(&self, record: &mut FeedbackRecord, outcome: &TaskOutcome<CategoryAssignment>) {
        let assignment = match outcome {
            TaskOutcome::Completed(assignment) => assignment.clone(),
            TaskOutcome::Failed(_) => CategoryAssignment::fallback(),
            TaskOutcome::Skipped => return,
        };
        record.category = Some(assignment.category);
        record.sub_category = Some(assignment.sub_category);
    }
}

/// Labels the failure mode described by a THUMBS_DOWN comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentFailureClassification;

impl EnrichmentTask for CommentFailureClassification {
    type Output = String;

    fn name(&self) -> &'static str {
        "feedback comment categorization"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[FEEDBACK_COMMENT_CATEGORY]
    }

    fn applies_to(&self, record: &FeedbackRecord) -> bool {
        record.is_thumbs_down() && !record.has_blank_comment()
    }

    fn build_request(&self, record: &FeedbackRecord) -> CompletionRequest {
        CompletionRequest::new(
            FAILURE_SYSTEM_PROMPT.as_str(),
            format!(
                "Feedback Comment: {}\n\nCategorize this feedback comment.",
                record.feedback_comment.as_deref().unwrap_or_default()
            ),
        )
    }

    fn parse_response(&self, response: &Value) -> Result<String> {
        let label = required_str(response, "feedback_comment_category")?;
        Ok(taxonomy::resolve_failure_category(label))
    }

    fn apply(&self, record: &mut FeedbackRecord, outcome: &TaskOutcome<String>) {
        record.feedback_comment_category = outcome.value().cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FeedbackRating;
    use serde_json::json;

    fn down(comment: Option<&str>) -> FeedbackRecord {
        let mut r = FeedbackRecord::new("t", "How do I pay by FPS?", "Please call us.", FeedbackRating::ThumbsDown);
        r.feedback_comment = comment.map(|c| c.to_string());
        r
    }

    fn up() -> FeedbackRecord {
        FeedbackRecord::new("t", "q", "a", FeedbackRating::ThumbsUp)
    }

    #[test]
    fn test_comment_generation_predicate() {
        let task = CommentGeneration;
        assert!(task.applies_to(&down(None)));
        assert!(task.applies_to(&down(Some("  "))));
        assert!(!task.applies_to(&down(Some("Useless"))));
        assert!(!task.applies_to(&up()));
    }

    #[test]
    fn test_comment_failure_predicate() {
        let task = CommentFailureClassification;
        assert!(task.applies_to(&down(Some("Useless"))));
        assert!(!task.applies_to(&down(None)));
        assert!(!task.applies_to(&up().with_comment("Great")));
    }

    #[test]
    fn test_comment_request_carries_question_and_answer() {
        let request = CommentGeneration.build_request(&down(None));
        assert!(request.system.contains("THUMBS_DOWN"));
        assert!(request.user.contains("How do I pay by FPS?"));
        assert!(request.user.contains("Please call us."));
    }

    #[test]
    fn test_category_prompt_lists_taxonomy() {
        let request = CategoryClassification.build_request(&up());
        assert!(request.system.contains("Payments and transfers"));
        assert!(request.system.contains("├── Faster Payment System (FPS)"));
        let request = CommentFailureClassification.build_request(&down(Some("x")));
        assert!(request.system.contains("- Redirect to Customer Service:"));
    }

    #[test]
    fn test_category_parse_and_fallbacks() {
        let task = CategoryClassification;
        let ok = task
            .parse_response(&json!({"category": "Loans", "sub_category": "Personal Tax Loan"}))
            .unwrap();
        assert_eq!(ok.category, "Loans");
        assert_eq!(ok.sub_category, "Personal Tax Loan");

        let unknown = task
            .parse_response(&json!({"category": "Weather", "sub_category": "Rain"}))
            .unwrap();
        assert_eq!(unknown, CategoryAssignment::fallback());

        assert!(task.parse_response(&json!({"category": "Loans"})).is_err());
    }

    #[test]
    fn test_category_failure_applies_fallback_pair() {
        let mut record = up();
        CategoryClassification.apply(&mut record, &TaskOutcome::Failed("boom".to_string()));
        assert_eq!(record.category.as_deref(), Some("other"));
        assert_eq!(record.sub_category.as_deref(), Some("General"));
    }

    #[test]
    fn test_comment_apply_keeps_blank_on_failure() {
        let mut record = down(None);
        CommentGeneration.apply(&mut record, &TaskOutcome::Failed("timeout".to_string()));
        assert_eq!(record.feedback_comment, None);
        CommentGeneration.apply(&mut record, &TaskOutcome::Completed("Not helpful.".to_string()));
        assert_eq!(record.feedback_comment.as_deref(), Some("Not helpful."));
    }

    #[test]
    fn test_comment_parse_rejects_empty() {
        assert!(CommentGeneration.parse_response(&json!({"comment": "  "})).is_err());
        assert!(CommentGeneration.parse_response(&json!({"text": "hi"})).is_err());
    }

    #[test]
    fn test_failure_parse_maps_unknown_to_general() {
        let task = CommentFailureClassification;
        assert_eq!(
            task.parse_response(&json!({"feedback_comment_category": "Error Messages"})).unwrap(),
            "Error Messages"
        );
        assert_eq!(
            task.parse_response(&json!({"feedback_comment_category": "Bad vibes"})).unwrap(),
            "General"
        );
    }
}
