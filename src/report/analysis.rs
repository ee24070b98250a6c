//! Report statistics
//!
//! Every figure in the markdown report is computed here as a pure function of
//! the analyzed dataset. Sub-analyses whose columns are absent come back as
//! `None` or empty and are left out of the report.

use crate::dataset::Dataset;
use crate::record::{FeedbackRecord, Scenario, CATEGORY, FEEDBACK_COMMENT_CATEGORY, SCENARIO};
use chrono::{Datelike, NaiveDate, Weekday};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\b[a-zA-Z]{3,}\b").unwrap();
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
        "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
        "see", "two", "who", "boy", "did", "she", "use", "way", "why", "too", "any", "few", "man",
        "let", "put", "say",
    ]
    .into_iter()
    .collect();
}

const LENGTH_BUCKETS: usize = 5;
const TOP_KEYWORDS: usize = 10;

/// Interactions and thumbs-up share for one group of records.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateStats {
    pub interactions: usize,
    pub satisfaction: f64,
}

impl RateStats {
    fn of<'a>(records: impl IntoIterator<Item = &'a FeedbackRecord>) -> Self {
        let (total, up) = records
            .into_iter()
            .fold((0usize, 0usize), |(total, up), r| (total + 1, up + usize::from(!r.is_thumbs_down())));
        Self {
            interactions: total,
            satisfaction: ratio(up, total),
        }
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicMetrics {
    pub total: usize,
    pub thumbs_up: usize,
    pub thumbs_down: usize,
    pub satisfaction_rate: f64,
    pub feedback_completion_rate: f64,
    pub records_with_comments: usize,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioStats {
    pub scenario: Scenario,
    pub stats: RateStats,
    pub avg_daily_interactions: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyScenarioRow {
    pub date: NaiveDate,
    pub a: usize,
    pub b: usize,
    pub a_satisfaction: Option<f64>,
    pub b_satisfaction: Option<f64>,
}

impl DailyScenarioRow {
    pub fn total(&self) -> usize {
        self.a + self.b
    }

    pub fn a_share(&self) -> f64 {
        ratio(self.a, self.total())
    }

    pub fn b_share(&self) -> f64 {
        ratio(self.b, self.total())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioAnalysis {
    pub overall: Vec<ScenarioStats>,
    pub daily: Vec<DailyScenarioRow>,
}

impl ScenarioAnalysis {
    pub fn stats_for(&self, scenario: Scenario) -> Option<&ScenarioStats> {
        self.overall.iter().find(|s| s.scenario == scenario)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalAnalysis {
    pub daily: Vec<(NaiveDate, RateStats)>,
    /// Monday first.
    pub weekly: Vec<(Weekday, RateStats)>,
    pub peak_date: Option<NaiveDate>,
    pub scenarios: Option<ScenarioAnalysis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub name: String,
    pub stats: RateStats,
    pub comments_received: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAnalysis {
    /// Alphabetical by category name.
    pub categories: Vec<CategoryStats>,
    pub sub_categories: Vec<((String, String), RateStats)>,
    pub best: CategoryStats,
    pub worst: CategoryStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentQuality {
    pub avg_response_length: f64,
    pub median_response_length: f64,
    pub avg_question_length: f64,
    pub median_question_length: f64,
    /// `("<left>-<right> chars", satisfaction)` for each non-empty bucket.
    pub length_satisfaction: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureBreakdown {
    pub failure_labels: Vec<String>,
    pub rows: Vec<(String, Vec<usize>)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NegativeFeedback {
    pub count: usize,
    pub by_category: Vec<(String, usize)>,
    pub failure_distribution: Vec<(String, usize)>,
    pub breakdown: FailureBreakdown,
    pub complaint_keywords: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailuresByDate {
    pub labels: Vec<String>,
    pub rows: Vec<(NaiveDate, Vec<usize>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackAnalysis {
    pub basic: BasicMetrics,
    pub temporal: TemporalAnalysis,
    pub categories: Option<CategoryAnalysis>,
    pub content: ContentQuality,
    pub question_types: Vec<(String, RateStats)>,
    pub negative: NegativeFeedback,
    pub failures_by_date: Option<FailuresByDate>,
    pub data_completeness: f64,
}

/// Full analysis; `None` for an empty dataset.
pub fn analyze(dataset: &Dataset) -> Option<FeedbackAnalysis> {
    if dataset.is_empty() {
        return None;
    }
    let records = &dataset.records;

    Some(FeedbackAnalysis {
        basic: basic_metrics(records),
        temporal: temporal_analysis(records, dataset.has_column(SCENARIO)),
        categories: dataset
            .has_column(CATEGORY)
            .then(|| category_analysis(records))
            .flatten(),
        content: content_quality(records),
        question_types: question_type_stats(records),
        negative: negative_feedback(records),
        failures_by_date: dataset
            .has_column(FEEDBACK_COMMENT_CATEGORY)
            .then(|| failures_by_date(records))
            .flatten(),
        data_completeness: data_completeness(dataset),
    })
}

pub fn basic_metrics(records: &[FeedbackRecord]) -> BasicMetrics {
    let total = records.len();
    let thumbs_down = records.iter().filter(|r| r.is_thumbs_down()).count();
    let thumbs_up = total - thumbs_down;
    let records_with_comments = records.iter().filter(|r| r.feedback_comment.is_some()).count();

    let dates = records.iter().filter_map(|r| r.date());
    let date_range = dates.minmax().into_option().map(|(start, end)| DateRange {
        start,
        end,
        total_days: (end - start).num_days() + 1,
    });

    BasicMetrics {
        total,
        thumbs_up,
        thumbs_down,
        satisfaction_rate: ratio(thumbs_up, total),
        feedback_completion_rate: ratio(records_with_comments, total),
        records_with_comments,
        date_range,
    }
}

pub fn temporal_analysis(records: &[FeedbackRecord], with_scenarios: bool) -> TemporalAnalysis {
    let mut by_date: BTreeMap<NaiveDate, Vec<&FeedbackRecord>> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date() {
            by_date.entry(date).or_default().push(record);
        }
    }

    let daily: Vec<(NaiveDate, RateStats)> = by_date
        .iter()
        .map(|(date, rows)| (*date, RateStats::of(rows.iter().copied())))
        .collect();

    // First date wins on ties.
    let peak_date = daily
        .iter()
        .fold(None::<&(NaiveDate, RateStats)>, |best, row| match best {
            Some(b) if b.1.interactions >= row.1.interactions => Some(b),
            _ => Some(row),
        })
        .map(|(date, _)| *date);

    let mut by_weekday: BTreeMap<u32, (Weekday, Vec<&FeedbackRecord>)> = BTreeMap::new();
    for (date, rows) in &by_date {
        let weekday = date.weekday();
        by_weekday
            .entry(weekday.num_days_from_monday())
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .extend(rows.iter().copied());
    }
    let weekly = by_weekday
        .into_values()
        .map(|(weekday, rows)| (weekday, RateStats::of(rows)))
        .collect();

    let scenarios = with_scenarios.then(|| scenario_analysis(&by_date)).flatten();

    TemporalAnalysis {
        daily,
        weekly,
        peak_date,
        scenarios,
    }
}

fn scenario_analysis(by_date: &BTreeMap<NaiveDate, Vec<&FeedbackRecord>>) -> Option<ScenarioAnalysis> {
    let day_count = by_date.len();
    let tagged: Vec<(&NaiveDate, &FeedbackRecord)> = by_date
        .iter()
        .flat_map(|(date, rows)| rows.iter().map(move |r| (date, *r)))
        .filter(|(_, r)| r.scenario.is_some())
        .collect();
    if tagged.is_empty() {
        return None;
    }

    let overall = [Scenario::A, Scenario::B]
        .into_iter()
        .filter_map(|scenario| {
            let rows: Vec<&FeedbackRecord> = tagged
                .iter()
                .filter(|(_, r)| r.scenario == Some(scenario))
                .map(|(_, r)| *r)
                .collect();
            (!rows.is_empty()).then(|| ScenarioStats {
                scenario,
                stats: RateStats::of(rows.iter().copied()),
                avg_daily_interactions: ratio(rows.len(), day_count),
            })
        })
        .collect();

    let daily = tagged
        .iter()
        .group_by(|(date, _)| **date)
        .into_iter()
        .map(|(date, group)| {
            let rows: Vec<&FeedbackRecord> = group.map(|(_, r)| *r).collect();
            let a: Vec<&FeedbackRecord> = rows.iter().copied().filter(|r| r.scenario == Some(Scenario::A)).collect();
            let b: Vec<&FeedbackRecord> = rows.iter().copied().filter(|r| r.scenario == Some(Scenario::B)).collect();
            DailyScenarioRow {
                date,
                a: a.len(),
                b: b.len(),
                a_satisfaction: (!a.is_empty()).then(|| RateStats::of(a.iter().copied()).satisfaction),
                b_satisfaction: (!b.is_empty()).then(|| RateStats::of(b.iter().copied()).satisfaction),
            }
        })
        .collect();

    Some(ScenarioAnalysis { overall, daily })
}

/// `None` when no record carries a category.
pub fn category_analysis(records: &[FeedbackRecord]) -> Option<CategoryAnalysis> {
    let mut by_category: BTreeMap<&str, Vec<&FeedbackRecord>> = BTreeMap::new();
    let mut by_sub: BTreeMap<(&str, &str), Vec<&FeedbackRecord>> = BTreeMap::new();
    for record in records {
        if let Some(category) = record.category.as_deref() {
            by_category.entry(category).or_default().push(record);
            if let Some(sub) = record.sub_category.as_deref() {
                by_sub.entry((category, sub)).or_default().push(record);
            }
        }
    }

    let categories: Vec<CategoryStats> = by_category
        .into_iter()
        .map(|(name, rows)| CategoryStats {
            name: name.to_string(),
            stats: RateStats::of(rows.iter().copied()),
            comments_received: rows.iter().filter(|r| r.feedback_comment.is_some()).count(),
        })
        .collect();

    let mut best = categories.first()?;
    let mut worst = best;
    for stats in &categories {
        if stats.stats.satisfaction > best.stats.satisfaction {
            best = stats;
        }
        if stats.stats.satisfaction < worst.stats.satisfaction {
            worst = stats;
        }
    }
    let (best, worst) = (best.clone(), worst.clone());

    let sub_categories = by_sub
        .into_iter()
        .map(|((category, sub), rows)| ((category.to_string(), sub.to_string()), RateStats::of(rows)))
        .collect();

    Some(CategoryAnalysis {
        categories,
        sub_categories,
        best,
        worst,
    })
}

fn mean(values: &[usize]) -> f64 {
    ratio(values.iter().sum(), values.len())
}

fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted: Vec<usize> = values.iter().copied().sorted().collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Five equal-width bins over the observed range, right edge inclusive. The
/// lowest edge is pulled down by 0.1% of the range so the minimum falls inside.
fn length_bin_edges(min: f64, max: f64) -> [f64; LENGTH_BUCKETS + 1] {
    let (lo, hi) = if min == max {
        let adjust = if min == 0.0 { 0.001 } else { min.abs() * 0.001 };
        (min - adjust, max + adjust)
    } else {
        (min, max)
    };

    let step = (hi - lo) / LENGTH_BUCKETS as f64;
    let mut edges = [0.0; LENGTH_BUCKETS + 1];
    for (i, edge) in edges.iter_mut().enumerate() {
        *edge = lo + step * i as f64;
    }
    edges[LENGTH_BUCKETS] = hi;
    if min != max {
        edges[0] -= (max - min) * 0.001;
    }
    edges
}

pub fn content_quality(records: &[FeedbackRecord]) -> ContentQuality {
    let answer_lengths: Vec<usize> = records.iter().map(|r| r.bot_answer.chars().count()).collect();
    let question_lengths: Vec<usize> = records.iter().map(|r| r.user_question.chars().count()).collect();

    let length_satisfaction = match answer_lengths.iter().minmax().into_option() {
        Some((&min, &max)) => {
            let edges = length_bin_edges(min as f64, max as f64);
            let mut buckets: Vec<Vec<&FeedbackRecord>> = vec![Vec::new(); LENGTH_BUCKETS];
            for (record, &len) in records.iter().zip(&answer_lengths) {
                let idx = (0..LENGTH_BUCKETS)
                    .find(|&i| (len as f64) <= edges[i + 1])
                    .unwrap_or(LENGTH_BUCKETS - 1);
                buckets[idx].push(record);
            }
            buckets
                .into_iter()
                .enumerate()
                .filter(|(_, rows)| !rows.is_empty())
                .map(|(i, rows)| {
                    (
                        format!("{}-{} chars", edges[i] as i64, edges[i + 1] as i64),
                        RateStats::of(rows).satisfaction,
                    )
                })
                .collect()
        }
        None => Vec::new(),
    };

    ContentQuality {
        avg_response_length: mean(&answer_lengths),
        median_response_length: median(&answer_lengths),
        avg_question_length: mean(&question_lengths),
        median_question_length: median(&question_lengths),
        length_satisfaction,
    }
}

/// Substring rules, first match wins.
pub fn question_type(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("how") {
        "How"
    } else if q.contains("what") {
        "What"
    } else if q.contains("when") {
        "When"
    } else if q.contains("where") {
        "Where"
    } else if q.contains("why") {
        "Why"
    } else if ["can", "could", "is", "are", "do", "does"].iter().any(|w| q.contains(w)) {
        "Yes/No"
    } else {
        "Other"
    }
}

pub fn question_type_stats(records: &[FeedbackRecord]) -> Vec<(String, RateStats)> {
    let mut by_type: BTreeMap<&'static str, Vec<&FeedbackRecord>> = BTreeMap::new();
    for record in records {
        by_type.entry(question_type(&record.user_question)).or_default().push(record);
    }
    by_type
        .into_iter()
        .map(|(kind, rows)| (kind.to_string(), RateStats::of(rows)))
        .collect()
}

/// Most frequent first; ties keep the order of first appearance.
fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    order
        .into_iter()
        .map(|v| (v.to_string(), counts[v]))
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .collect()
}

pub fn complaint_keywords(comments: &[&str]) -> Vec<(String, usize)> {
    let text = comments.iter().map(|c| c.to_lowercase()).join(" ");
    let words = WORD_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(*w) && w.len() > 3);
    ranked_counts(words).into_iter().take(TOP_KEYWORDS).collect()
}

pub fn negative_feedback(records: &[FeedbackRecord]) -> NegativeFeedback {
    let negative: Vec<&FeedbackRecord> = records.iter().filter(|r| r.is_thumbs_down()).collect();
    if negative.is_empty() {
        return NegativeFeedback::default();
    }

    let by_category = negative
        .iter()
        .filter_map(|r| r.category.as_deref())
        .counts()
        .into_iter()
        .map(|(c, n)| (c.to_string(), n))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect();

    let failure_distribution = negative
        .iter()
        .filter_map(|r| r.feedback_comment_category.as_deref())
        .counts()
        .into_iter()
        .map(|(c, n)| (c.to_string(), n))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect();

    let pairs: Vec<(&str, &str)> = negative
        .iter()
        .filter_map(|r| Some((r.category.as_deref()?, r.feedback_comment_category.as_deref()?)))
        .collect();
    let failure_labels: Vec<String> = pairs
        .iter()
        .map(|(_, f)| *f)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows = pairs
        .iter()
        .map(|(c, _)| *c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|category| {
            let counts = failure_labels
                .iter()
                .map(|label| pairs.iter().filter(|(c, f)| *c == category && *f == label.as_str()).count())
                .collect();
            (category.to_string(), counts)
        })
        .collect();

    let comments: Vec<&str> = negative.iter().filter_map(|r| r.feedback_comment.as_deref()).collect();

    NegativeFeedback {
        count: negative.len(),
        by_category,
        failure_distribution,
        breakdown: FailureBreakdown { failure_labels, rows },
        complaint_keywords: complaint_keywords(&comments),
    }
}

/// `None` when no dated record carries a failure category.
pub fn failures_by_date(records: &[FeedbackRecord]) -> Option<FailuresByDate> {
    let dated: Vec<(NaiveDate, &str)> = records
        .iter()
        .filter_map(|r| Some((r.date()?, r.feedback_comment_category.as_deref()?)))
        .collect();
    if dated.is_empty() {
        return None;
    }

    let labels: Vec<String> = dated
        .iter()
        .map(|(_, l)| *l)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows = dated
        .iter()
        .map(|(d, _)| *d)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|date| {
            let counts = labels
                .iter()
                .map(|label| dated.iter().filter(|(d, l)| *d == date && *l == label.as_str()).count())
                .collect();
            (date, counts)
        })
        .collect();

    Some(FailuresByDate { labels, rows })
}

/// Share of non-empty cells over every written column.
pub fn data_completeness(dataset: &Dataset) -> f64 {
    let (headers, rows) = dataset.to_rows();
    let cells = headers.len() * rows.len();
    let empty = rows.iter().flatten().filter(|c| c.is_empty()).count();
    1.0 - ratio(empty, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FeedbackRating;

    fn rec(time: &str, question: &str, answer: &str, rating: FeedbackRating) -> FeedbackRecord {
        FeedbackRecord::new(time, question, answer, rating)
    }

    fn sample() -> Vec<FeedbackRecord> {
        let mut a = rec("2025-06-02 09:00:00", "How do I pay by FPS?", "Use the app.", FeedbackRating::ThumbsUp);
        a.category = Some("Payments and transfers".to_string());
        a.sub_category = Some("Faster Payment System (FPS)".to_string());
        a.scenario = Some(Scenario::A);

        let mut b = rec("2025-06-02 10:00:00", "What are the fees?", "Please call us.", FeedbackRating::ThumbsDown)
            .with_comment("Redirected to hotline instead of answering the fees question");
        b.category = Some("Accounts".to_string());
        b.sub_category = Some("General".to_string());
        b.feedback_comment_category = Some("Redirect to Customer Service".to_string());
        b.scenario = Some(Scenario::B);

        let mut c = rec("2025-06-03 10:00:00", "Rates", "Rates vary by product and tenor.", FeedbackRating::ThumbsDown)
            .with_comment("Vague answer, rates missing, vague");
        c.category = Some("Accounts".to_string());
        c.sub_category = Some("Time Deposits".to_string());
        c.feedback_comment_category = Some("Ambiguous/Vague Response".to_string());
        c.scenario = Some(Scenario::B);

        vec![a, b, c]
    }

    #[test]
    fn test_basic_metrics() {
        let m = basic_metrics(&sample());
        assert_eq!(m.total, 3);
        assert_eq!(m.thumbs_up, 1);
        assert_eq!(m.thumbs_down, 2);
        assert!((m.satisfaction_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.records_with_comments, 2);
        let range = m.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(range.total_days, 2);
    }

    #[test]
    fn test_temporal_daily_weekly_and_peak() {
        let t = temporal_analysis(&sample(), true);
        assert_eq!(t.daily.len(), 2);
        assert_eq!(t.daily[0].1.interactions, 2);
        assert_eq!(t.peak_date, NaiveDate::from_ymd_opt(2025, 6, 2));
        // 2025-06-02 is a Monday.
        assert_eq!(t.weekly[0].0, Weekday::Mon);
        assert_eq!(t.weekly[1].0, Weekday::Tue);

        let s = t.scenarios.unwrap();
        let a = s.stats_for(Scenario::A).unwrap();
        assert_eq!(a.stats.interactions, 1);
        assert!((a.avg_daily_interactions - 0.5).abs() < 1e-9);
        assert_eq!(s.daily[0].a, 1);
        assert_eq!(s.daily[0].b, 1);
        assert_eq!(s.daily[1].a_satisfaction, None);
        assert_eq!(s.daily[1].b_satisfaction, Some(0.0));
    }

    #[test]
    fn test_category_best_and_worst() {
        let c = category_analysis(&sample()).unwrap();
        assert_eq!(c.categories[0].name, "Accounts");
        assert_eq!(c.categories[0].comments_received, 2);
        assert_eq!(c.best.name, "Payments and transfers");
        assert_eq!(c.worst.name, "Accounts");
        assert_eq!(c.sub_categories.len(), 3);
    }

    #[test]
    fn test_question_types() {
        assert_eq!(question_type("How do I pay?"), "How");
        assert_eq!(question_type("WHAT are fees"), "What");
        assert_eq!(question_type("Is it open"), "Yes/No");
        assert_eq!(question_type("Rates"), "Other");
    }

    #[test]
    fn test_length_buckets_cover_every_record() {
        let q = content_quality(&sample());
        assert_eq!(q.length_satisfaction.len(), 2);
        assert!(q.length_satisfaction[0].0.ends_with(" chars"));
        assert!((q.median_response_length - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_length_bucket() {
        let records = vec![
            rec("2025-06-02", "q", "same", FeedbackRating::ThumbsUp),
            rec("2025-06-03", "q", "same", FeedbackRating::ThumbsDown),
        ];
        let q = content_quality(&records);
        assert_eq!(q.length_satisfaction, vec![("3-4 chars".to_string(), 0.5)]);
    }

    #[test]
    fn test_negative_feedback_breakdowns() {
        let n = negative_feedback(&sample());
        assert_eq!(n.count, 2);
        assert_eq!(n.by_category, vec![("Accounts".to_string(), 2)]);
        assert_eq!(n.failure_distribution.len(), 2);
        assert_eq!(n.breakdown.rows, vec![("Accounts".to_string(), vec![1, 1])]);
        assert_eq!(n.complaint_keywords[0], ("vague".to_string(), 2));
    }

    #[test]
    fn test_keywords_drop_stop_words_and_short_words() {
        let words = complaint_keywords(&["The answer was not helpful, not helpful at all", "Too long"]);
        assert_eq!(words[0], ("helpful".to_string(), 2));
        assert!(words.iter().all(|(w, _)| w != "the" && w != "not" && w != "was"));
        assert!(words.iter().all(|(w, _)| w.len() > 3));
    }

    #[test]
    fn test_failures_by_date() {
        let f = failures_by_date(&sample()).unwrap();
        assert_eq!(f.labels, vec!["Ambiguous/Vague Response", "Redirect to Customer Service"]);
        assert_eq!(f.rows[0].1, vec![0, 1]);
        assert_eq!(f.rows[1].1, vec![1, 0]);
    }
}
