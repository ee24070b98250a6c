//! Scenario tagger
//!
//! Marks each record `A` when its question comes from the provided question
//! list and `B` otherwise. Purely local, no completion calls.

use crate::error::{PipelineError, Result};
use crate::record::{FeedbackRecord, Scenario};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

const QUESTION_COLUMN: &str = "question";

/// Lowercased, trimmed, trailing `?`/`!`/`.` dropped.
pub fn normalize_question(question: &str) -> String {
    question
        .trim()
        .to_lowercase()
        .trim_end_matches(&['?', '!', '.'][..])
        .trim()
        .to_string()
}

/// Normalized provided questions, read from the `question` column.
pub fn read_known_questions(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

    let position = rdr
        .headers()?
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}') == QUESTION_COLUMN)
        .ok_or_else(|| {
            PipelineError::Schema(format!(
                "{} has no '{}' column",
                path.display(),
                QUESTION_COLUMN
            ))
        })?;

    let mut questions = HashSet::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(question) = record.get(position).map(normalize_question) {
            if !question.is_empty() {
                questions.insert(question);
            }
        }
    }
    Ok(questions)
}

/// Like `read_known_questions`, but a missing or unreadable list yields an
/// empty set.
pub fn load_known_questions(path: &Path) -> HashSet<String> {
    match read_known_questions(path) {
        Ok(questions) => {
            info!("Loaded {} mapped questions", questions.len());
            questions
        }
        Err(PipelineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found", path.display());
            HashSet::new()
        }
        Err(e) => {
            warn!("Error loading mapped questions: {}", e);
            HashSet::new()
        }
    }
}

pub fn classify(question: &str, known_questions: &HashSet<String>) -> Scenario {
    if known_questions.contains(&normalize_question(question)) {
        Scenario::A
    } else {
        Scenario::B
    }
}

/// Sets `scenario` on every record and returns the (A, B) counts.
pub fn tag_scenarios(records: &mut [FeedbackRecord], known_questions: &HashSet<String>) -> (usize, usize) {
    info!("Adding scenario mapping to {} records...", records.len());
    if known_questions.is_empty() {
        warn!("No mapped questions loaded, setting all scenarios to 'B'");
    }

    let mut counts = (0, 0);
    for record in records.iter_mut() {
        let scenario = classify(&record.user_question, known_questions);
        match scenario {
            Scenario::A => counts.0 += 1,
            Scenario::B => counts.1 += 1,
        }
        record.scenario = Some(scenario);
    }

    if !records.is_empty() {
        let total = records.len() as f64;
        info!(
            "Scenario A ({}): {} ({:.1}%), Scenario B ({}): {} ({:.1}%)",
            Scenario::A.description(),
            counts.0,
            counts.0 as f64 / total * 100.0,
            Scenario::B.description(),
            counts.1,
            counts.1 as f64 / total * 100.0
        );
    }
    counts
}
