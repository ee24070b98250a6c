//! Distribution summary logged at the end of a full run.

use crate::dataset::Dataset;
use crate::record::Scenario;
use itertools::Itertools;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisSummary {
    pub total: usize,
    pub ratings: Vec<(String, usize)>,
    pub categories: Vec<(String, usize)>,
    pub sub_categories: Vec<(String, usize)>,
    pub failure_categories: Vec<(String, usize)>,
    pub scenarios: Vec<(Scenario, usize)>,
    pub category_pairs: Vec<((String, String), usize)>,
    pub empty_comments: usize,
    pub thumbs_down_empty_comments: usize,
}

/// Value counts, most frequent first, ties by value.
fn distribution<T: Ord + Clone + std::hash::Hash>(values: impl Iterator<Item = T>) -> Vec<(T, usize)> {
    values
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

pub fn summarize(dataset: &Dataset) -> AnalysisSummary {
    let records = &dataset.records;
    AnalysisSummary {
        total: records.len(),
        ratings: distribution(records.iter().map(|r| r.feedback_rating.to_string())),
        categories: distribution(records.iter().filter_map(|r| r.category.clone())),
        sub_categories: distribution(records.iter().filter_map(|r| r.sub_category.clone())),
        failure_categories: distribution(records.iter().filter_map(|r| r.feedback_comment_category.clone())),
        scenarios: distribution(records.iter().filter_map(|r| r.scenario)),
        category_pairs: distribution(
            records
                .iter()
                .filter_map(|r| Some((r.category.clone()?, r.sub_category.clone()?))),
        ),
        empty_comments: records.iter().filter(|r| r.has_blank_comment()).count(),
        thumbs_down_empty_comments: records
            .iter()
            .filter(|r| r.is_thumbs_down() && r.has_blank_comment())
            .count(),
    }
}

impl AnalysisSummary {
    fn pct(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn log(&self) {
        info!("=== FEEDBACK ANALYSIS SUMMARY ===");
        info!("Total records: {}", self.total);

        let sections: [(&str, &Vec<(String, usize)>); 4] = [
            ("Feedback Rating", &self.ratings),
            ("Category", &self.categories),
            ("Sub-Category", &self.sub_categories),
            ("Feedback Comment Category", &self.failure_categories),
        ];
        for (title, rows) in sections {
            if rows.is_empty() {
                continue;
            }
            info!("{} Distribution:", title);
            for (value, count) in rows {
                info!("  {}: {} ({:.1}%)", value, count, self.pct(*count));
            }
        }

        if !self.scenarios.is_empty() {
            info!("Scenario Distribution:");
            for (scenario, count) in &self.scenarios {
                info!(
                    "  Scenario {} ({}): {} ({:.1}%)",
                    scenario,
                    scenario.description(),
                    count,
                    self.pct(*count)
                );
            }
        }

        if !self.category_pairs.is_empty() {
            info!("Category-SubCategory Distribution:");
            for ((category, sub_category), count) in &self.category_pairs {
                info!("  {} -> {}: {}", category, sub_category, count);
            }
        }

        info!(
            "Empty feedback comments: {} ({:.1}%)",
            self.empty_comments,
            self.pct(self.empty_comments)
        );
        info!(
            "THUMBS_DOWN with empty comments: {} ({:.1}%)",
            self.thumbs_down_empty_comments,
            self.pct(self.thumbs_down_empty_comments)
        );
    }
}
