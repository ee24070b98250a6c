//! Dataset - an ordered table of feedback records
//!
//! Reads and writes the CSV layout of the feedback exports. Known columns are
//! mapped onto `FeedbackRecord` fields by header name; every other column is
//! carried through untouched so that rewriting an output never drops data.

use crate::error::{PipelineError, Result};
use crate::record::{
    FeedbackRecord, RecordIdentity, BOT_ANSWER, CATEGORY, FEEDBACK_COMMENT,
    FEEDBACK_COMMENT_CATEGORY, FEEDBACK_RATING, KNOWN_COLUMNS, REQUEST_TIME, REQUIRED_COLUMNS,
    SCENARIO, SUB_CATEGORY, USER_QUESTION,
};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Write};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<FeedbackRecord>,
    /// Names of passthrough columns, in file order.
    pub extra_columns: Vec<String>,
    /// Annotation columns that exist on this table even when every cell is empty.
    annotation_columns: BTreeSet<&'static str>,
}

impl Dataset {
    pub fn new(records: Vec<FeedbackRecord>) -> Self {
        Self {
            records,
            extra_columns: Vec::new(),
            annotation_columns: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedbackRecord> {
        self.records.iter()
    }

    pub fn identities(&self) -> impl Iterator<Item = RecordIdentity> + '_ {
        self.records.iter().map(|r| r.identity())
    }

    /// Declares an annotation column so it is written even while still empty.
    pub fn mark_column(&mut self, column: &'static str) {
        self.annotation_columns.insert(column);
    }

    pub fn has_column(&self, column: &str) -> bool {
        if REQUIRED_COLUMNS.contains(&column) || column == FEEDBACK_COMMENT {
            return true;
        }
        self.annotation_columns.contains(column)
            || self.records.iter().any(|r| annotation_cell(r, column).is_some())
            || self.extra_columns.iter().any(|c| c == column)
    }

    /// Rows at the given positions, keeping this table's column layout.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            records: indices.iter().filter_map(|&i| self.records.get(i).cloned()).collect(),
            extra_columns: self.extra_columns.clone(),
            annotation_columns: self.annotation_columns.clone(),
        }
    }

    /// Re-lays every record's passthrough cells onto `columns`; cells for
    /// columns this table did not have become empty.
    pub fn align_extra_columns(&mut self, columns: &[String]) {
        if self.extra_columns == columns {
            return;
        }
        let positions: HashMap<&str, usize> = self
            .extra_columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        for record in &mut self.records {
            let old = std::mem::take(&mut record.extra);
            record.extra = columns
                .iter()
                .map(|c| positions.get(c.as_str()).and_then(|&i| old.get(i).cloned().flatten()))
                .collect();
        }
        self.extra_columns = columns.to_vec();
    }

    /// Appends `other`'s rows after this table's rows, unioning both layouts.
    pub fn append(&mut self, mut other: Dataset) {
        let mut columns = self.extra_columns.clone();
        for column in &other.extra_columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        self.align_extra_columns(&columns);
        other.align_extra_columns(&columns);
        self.annotation_columns.extend(other.annotation_columns);
        self.records.extend(other.records);
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect::<Vec<_>>();

        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| position(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Schema(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let request_time_idx = position(REQUEST_TIME);
        let question_idx = position(USER_QUESTION);
        let answer_idx = position(BOT_ANSWER);
        let rating_idx = position(FEEDBACK_RATING);
        let comment_idx = position(FEEDBACK_COMMENT);
        let category_idx = position(CATEGORY);
        let sub_category_idx = position(SUB_CATEGORY);
        let comment_category_idx = position(FEEDBACK_COMMENT_CATEGORY);
        let scenario_idx = position(SCENARIO);

        let extra_idx: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !KNOWN_COLUMNS.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect();

        let mut dataset = Dataset {
            records: Vec::new(),
            extra_columns: extra_idx.iter().map(|&i| headers[i].clone()).collect(),
            annotation_columns: BTreeSet::new(),
        };
        for (column, idx) in [
            (CATEGORY, category_idx),
            (SUB_CATEGORY, sub_category_idx),
            (FEEDBACK_COMMENT_CATEGORY, comment_category_idx),
            (SCENARIO, scenario_idx),
        ] {
            if idx.is_some() {
                dataset.mark_column(column);
            }
        }

        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let text = |idx: Option<usize>| -> String {
                idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
            };
            let cell = |idx: Option<usize>| -> Option<String> {
                idx.and_then(|i| record.get(i))
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string())
            };

            let feedback_rating = text(rating_idx)
                .parse()
                .map_err(|e| PipelineError::Schema(format!("Row {}: {}", row + 1, e)))?;
            let scenario = match cell(scenario_idx) {
                Some(raw) => Some(
                    raw.parse()
                        .map_err(|e| PipelineError::Schema(format!("Row {}: {}", row + 1, e)))?,
                ),
                None => None,
            };

            dataset.records.push(FeedbackRecord {
                request_time: text(request_time_idx),
                user_question: text(question_idx),
                bot_answer: text(answer_idx),
                feedback_rating,
                feedback_comment: cell(comment_idx),
                category: cell(category_idx),
                sub_category: cell(sub_category_idx),
                feedback_comment_category: cell(comment_category_idx),
                scenario,
                extra: extra_idx.iter().map(|&i| cell(Some(i))).collect(),
            });
        }

        Ok(dataset)
    }

    fn known_columns(&self) -> Vec<&'static str> {
        KNOWN_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.has_column(c))
            .collect()
    }

    /// Column names in write order.
    pub fn headers(&self) -> Vec<String> {
        self.known_columns()
            .into_iter()
            .map(str::to_string)
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// Header row followed by one row of cells per record; empty cells are "".
    pub fn to_rows(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let known = self.known_columns();
        let headers = self.headers();

        let rows = self
            .records
            .iter()
            .map(|record| {
                let mut row: Vec<String> = known
                    .iter()
                    .map(|c| known_cell(record, c).unwrap_or_default())
                    .collect();
                row.extend(
                    (0..self.extra_columns.len())
                        .map(|i| record.extra.get(i).cloned().flatten().unwrap_or_default()),
                );
                row
            })
            .collect();

        (headers, rows)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        let (headers, rows) = self.to_rows();
        wtr.write_record(&headers)?;
        for row in rows {
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn annotation_cell(record: &FeedbackRecord, column: &str) -> Option<String> {
    match column {
        CATEGORY => record.category.clone(),
        SUB_CATEGORY => record.sub_category.clone(),
        FEEDBACK_COMMENT_CATEGORY => record.feedback_comment_category.clone(),
        SCENARIO => record.scenario.map(|s| s.to_string()),
        _ => None,
    }
}

fn known_cell(record: &FeedbackRecord, column: &str) -> Option<String> {
    match column {
        REQUEST_TIME => Some(record.request_time.clone()),
        USER_QUESTION => Some(record.user_question.clone()),
        BOT_ANSWER => Some(record.bot_answer.clone()),
        FEEDBACK_RATING => Some(record.feedback_rating.to_string()),
        FEEDBACK_COMMENT => record.feedback_comment.clone(),
        other => annotation_cell(record, other),
    }
}
