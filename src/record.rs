//! Feedback records and their identity.

use crate::error::{PipelineError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

pub const REQUEST_TIME: &str = "request_time";
pub const USER_QUESTION: &str = "user_question";
pub const BOT_ANSWER: &str = "bot_answer";
pub const FEEDBACK_RATING: &str = "feedback_rating";
pub const FEEDBACK_COMMENT: &str = "feedback_comment";
pub const CATEGORY: &str = "category";
pub const SUB_CATEGORY: &str = "sub_category";
pub const FEEDBACK_COMMENT_CATEGORY: &str = "feedback_comment_category";
pub const SCENARIO: &str = "scenario";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [REQUEST_TIME, USER_QUESTION, BOT_ANSWER, FEEDBACK_RATING];

/// Known columns in the order they are written back out.
pub const KNOWN_COLUMNS: [&str; 9] = [
    REQUEST_TIME,
    USER_QUESTION,
    BOT_ANSWER,
    FEEDBACK_RATING,
    FEEDBACK_COMMENT,
    CATEGORY,
    SUB_CATEGORY,
    FEEDBACK_COMMENT_CATEGORY,
    SCENARIO,
];

const IDENTITY_DELIMITER: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackRating {
    ThumbsUp,
    ThumbsDown,
}

impl FeedbackRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackRating::ThumbsUp => "THUMBS_UP",
            FeedbackRating::ThumbsDown => "THUMBS_DOWN",
        }
    }
}

impl FromStr for FeedbackRating {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "THUMBS_UP" => Ok(FeedbackRating::ThumbsUp),
            "THUMBS_DOWN" => Ok(FeedbackRating::ThumbsDown),
            other => Err(PipelineError::Schema(format!(
                "Unknown feedback_rating '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FeedbackRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A = question taken from the provided question list, B = open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scenario {
    A,
    B,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::A => "A",
            Scenario::B => "B",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::A => "provided questions",
            Scenario::B => "open-ended questions",
        }
    }
}

impl FromStr for Scenario {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" => Ok(Scenario::A),
            "B" => Ok(Scenario::B),
            other => Err(PipelineError::Schema(format!("Unknown scenario '{}'", other))),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplication key of a feedback event, keyed on the three fields as-is.
///
/// No normalization is applied, two records are the same event only when the
/// three fields are byte-equal. Displayed as `request_time|user_question|bot_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordIdentity {
    request_time: String,
    user_question: String,
    bot_answer: String,
}

impl RecordIdentity {
    pub fn new(request_time: &str, user_question: &str, bot_answer: &str) -> Self {
        Self {
            request_time: request_time.to_string(),
            user_question: user_question.to_string(),
            bot_answer: bot_answer.to_string(),
        }
    }
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.request_time, IDENTITY_DELIMITER, self.user_question, IDENTITY_DELIMITER, self.bot_answer
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub request_time: String,
    pub user_question: String,
    pub bot_answer: String,
    pub feedback_rating: FeedbackRating,
    pub feedback_comment: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub feedback_comment_category: Option<String>,
    pub scenario: Option<Scenario>,
    /// Passthrough cells, aligned with `Dataset::extra_columns`.
    pub extra: Vec<Option<String>>,
}

impl FeedbackRecord {
    pub fn new(
        request_time: impl Into<String>,
        user_question: impl Into<String>,
        bot_answer: impl Into<String>,
        feedback_rating: FeedbackRating,
    ) -> Self {
        Self {
            request_time: request_time.into(),
            user_question: user_question.into(),
            bot_answer: bot_answer.into(),
            feedback_rating,
            feedback_comment: None,
            category: None,
            sub_category: None,
            feedback_comment_category: None,
            scenario: None,
            extra: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.feedback_comment = Some(comment.into());
        self
    }

    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity::new(&self.request_time, &self.user_question, &self.bot_answer)
    }

    pub fn is_thumbs_down(&self) -> bool {
        self.feedback_rating == FeedbackRating::ThumbsDown
    }

    /// True when the comment is absent or only whitespace.
    pub fn has_blank_comment(&self) -> bool {
        self.feedback_comment
            .as_deref()
            .map(|c| c.trim().is_empty())
            .unwrap_or(true)
    }

    /// Parses `request_time`, accepting the layouts the feedback exports use.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_request_time(&self.request_time)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date())
    }
}

pub fn parse_request_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
