//! Markdown rendering of the feedback analysis report.

use super::analysis::FeedbackAnalysis;
use super::recommendations::pct;
use crate::record::Scenario;
use chrono::NaiveDateTime;

pub const NO_DATA_REPORT: &str = "# Error: No data available for analysis";

/// Formats an integer with thousands separators.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn optional_pct(value: Option<f64>) -> String {
    value.map(pct).unwrap_or_else(|| "N/A".to_string())
}

pub fn render_markdown(
    analysis: &FeedbackAnalysis,
    recommendations: &[String],
    generated_at: NaiveDateTime,
) -> String {
    let mut report = String::new();
    let basic = &analysis.basic;

    report.push_str("# 🤖 Chatbot Feedback Analysis Report\n\n");
    report.push_str(&format!(
        "**Generated on:** {}\n\n---\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    // Executive summary
    report.push_str("## 📊 Executive Summary\n\n### Key Metrics\n");
    report.push_str(&format!("- **Total Interactions:** {}\n", thousands(basic.total)));
    report.push_str(&format!(
        "- **Overall Satisfaction Rate:** {}\n",
        pct(basic.satisfaction_rate)
    ));
    report.push_str(&format!(
        "- **Thumbs Up:** {} ({})\n",
        thousands(basic.thumbs_up),
        pct(basic.thumbs_up as f64 / basic.total.max(1) as f64)
    ));
    report.push_str(&format!(
        "- **Thumbs Down:** {} ({})\n",
        thousands(basic.thumbs_down),
        pct(basic.thumbs_down as f64 / basic.total.max(1) as f64)
    ));
    report.push_str(&format!(
        "- **Feedback Completion Rate:** {}\n",
        pct(basic.feedback_completion_rate)
    ));
    match basic.date_range {
        Some(range) => report.push_str(&format!(
            "- **Analysis Period:** {} to {} ({} days)\n",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d"),
            range.total_days
        )),
        None => report.push_str("- **Analysis Period:** unknown (no parseable request times)\n"),
    }

    report.push_str("\n---\n\n## 🎯 Key Recommendations\n\n");
    for (i, rec) in recommendations.iter().enumerate() {
        report.push_str(&format!("{}. {}\n", i + 1, rec));
    }

    render_temporal(&mut report, analysis);
    render_categories(&mut report, analysis);
    render_content(&mut report, analysis);
    render_negative(&mut report, analysis);
    render_failures_by_date(&mut report, analysis);
    render_action_items(&mut report, analysis);

    report.push_str("\n\n---\n\n## 📊 Data Quality Notes\n\n");
    report.push_str(&format!("- **Total Records Analyzed:** {}\n", thousands(basic.total)));
    report.push_str(&format!(
        "- **Records with Comments:** {}\n",
        thousands(basic.records_with_comments)
    ));
    report.push_str(&format!("- **Data Completeness:** {}\n", pct(analysis.data_completeness)));
    report.push_str("\n---\n\n*Report generated by Feedback Analysis Pipeline v1.0*\n");

    report
}

fn render_temporal(report: &mut String, analysis: &FeedbackAnalysis) {
    let temporal = &analysis.temporal;

    report.push_str("\n\n---\n\n## 📈 Temporal Analysis\n\n### Usage Patterns\n");
    report.push_str(&format!(
        "- **Peak Usage Date:** {}\n",
        temporal
            .peak_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "No data available".to_string())
    ));

    report.push_str("\n### Daily Distribution\n| Date | Interactions | Satisfaction Rate |\n|------|-------------|------------------|\n");
    for (date, stats) in &temporal.daily {
        report.push_str(&format!("| {} | {} | {} |\n", date, stats.interactions, pct(stats.satisfaction)));
    }

    report.push_str("\n### Weekly Distribution\n| Day | Interactions | Satisfaction Rate |\n|-----|-------------|------------------|\n");
    for (day, stats) in &temporal.weekly {
        report.push_str(&format!(
            "| {} | {} | {} |\n",
            weekday_name(*day),
            stats.interactions,
            pct(stats.satisfaction)
        ));
    }

    let Some(scenarios) = &temporal.scenarios else {
        return;
    };

    report.push_str("\n### Scenario Analysis (Temporal)\n\n#### Overall Scenario Performance\n");
    report.push_str("| Scenario | Total Interactions | Satisfaction Rate | Avg Daily Interactions |\n");
    report.push_str("|----------|-------------------|------------------|----------------------|\n");
    for stats in &scenarios.overall {
        report.push_str(&format!(
            "| Scenario {} | {} | {} | {:.1} |\n",
            stats.scenario,
            stats.stats.interactions,
            pct(stats.stats.satisfaction),
            stats.avg_daily_interactions
        ));
    }

    report.push_str("\n#### Daily Scenario Distribution\n");
    report.push_str("| Date | Scenario A | Scenario B | Total | Scenario A % | Scenario B % | A Satisfaction | B Satisfaction |\n");
    report.push_str("|------|-----------|-----------|-------|-------------|-------------|---------------|---------------|\n");
    for row in &scenarios.daily {
        report.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            row.date,
            row.a,
            row.b,
            row.total(),
            pct(row.a_share()),
            pct(row.b_share()),
            optional_pct(row.a_satisfaction),
            optional_pct(row.b_satisfaction)
        ));
    }

    report.push_str(&format!(
        "\n*Scenario A = {}, Scenario B = {}.*\n",
        Scenario::A.description(),
        Scenario::B.description()
    ));
}

fn weekday_name(day: chrono::Weekday) -> &'static str {
    use chrono::Weekday::*;
    match day {
        Mon => "Monday",
        Tue => "Tuesday",
        Wed => "Wednesday",
        Thu => "Thursday",
        Fri => "Friday",
        Sat => "Saturday",
        Sun => "Sunday",
    }
}

fn render_categories(report: &mut String, analysis: &FeedbackAnalysis) {
    let Some(categories) = &analysis.categories else {
        return;
    };

    report.push_str("\n\n---\n\n## 🏷️ Category Performance\n\n### Overall Category Performance\n");
    report.push_str("| Category | Interactions | Satisfaction Rate | Comments Received |\n");
    report.push_str("|----------|-------------|------------------|------------------|\n");
    for c in &categories.categories {
        report.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            c.name,
            c.stats.interactions,
            pct(c.stats.satisfaction),
            c.comments_received
        ));
    }

    if !categories.sub_categories.is_empty() {
        report.push_str("\n### Sub-Category Performance\n");
        report.push_str("| Category | Sub-Category | Interactions | Satisfaction Rate |\n");
        report.push_str("|----------|--------------|-------------|------------------|\n");
        for ((category, sub), stats) in &categories.sub_categories {
            report.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                category,
                sub,
                stats.interactions,
                pct(stats.satisfaction)
            ));
        }
    }

    report.push_str("\n### Best vs Worst Performing Categories\n");
    report.push_str(&format!(
        "- **🏆 Best Performing:** {} ({} satisfaction)\n",
        categories.best.name,
        pct(categories.best.stats.satisfaction)
    ));
    report.push_str(&format!(
        "- **⚠️ Needs Improvement:** {} ({} satisfaction)\n",
        categories.worst.name,
        pct(categories.worst.stats.satisfaction)
    ));
}

fn render_content(report: &mut String, analysis: &FeedbackAnalysis) {
    let content = &analysis.content;

    report.push_str("\n\n---\n\n## 📝 Content Quality Analysis\n\n### Response Length Statistics\n");
    report.push_str(&format!(
        "- **Average Response Length:** {:.0} characters\n",
        content.avg_response_length
    ));
    report.push_str(&format!(
        "- **Median Response Length:** {:.0} characters\n",
        content.median_response_length
    ));
    report.push_str(&format!(
        "- **Average Question Length:** {:.0} characters\n",
        content.avg_question_length
    ));
    report.push_str(&format!(
        "- **Median Question Length:** {:.0} characters\n",
        content.median_question_length
    ));

    report.push_str("\n### Satisfaction by Response Length\n| Length Category | Satisfaction Rate |\n|-----------------|------------------|\n");
    for (label, satisfaction) in &content.length_satisfaction {
        report.push_str(&format!("| {} | {} |\n", label, pct(*satisfaction)));
    }

    report.push_str("\n\n---\n\n## ❓ Question Type Analysis\n\n");
    report.push_str("| Question Type | Interactions | Satisfaction Rate |\n|---------------|-------------|------------------|\n");
    for (kind, stats) in &analysis.question_types {
        report.push_str(&format!(
            "| {} | {} | {} |\n",
            kind,
            stats.interactions,
            pct(stats.satisfaction)
        ));
    }
}

fn render_negative(report: &mut String, analysis: &FeedbackAnalysis) {
    let negative = &analysis.negative;
    if negative.count == 0 {
        return;
    }

    report.push_str("\n\n---\n\n## 👎 Negative Feedback Analysis\n\n");
    report.push_str(&format!("**Negative Feedback Count:** {}\n", thousands(negative.count)));

    if !negative.failure_distribution.is_empty() {
        report.push_str("\n### Failed Cases Distribution by Feedback Comment Category\n");
        report.push_str("| Feedback Comment Category | Count | Percentage |\n|---------------------------|-------|------------|\n");
        for (label, count) in &negative.failure_distribution {
            report.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                label,
                count,
                *count as f64 / negative.count as f64 * 100.0
            ));
        }
    }

    let breakdown = &negative.breakdown;
    if !breakdown.rows.is_empty() {
        report.push_str("\n### Breakdown by Category and Feedback Comment Category\n| Category | ");
        for label in &breakdown.failure_labels {
            report.push_str(&format!("{} | ", label));
        }
        report.push_str("Total |\n");
        report.push_str(&format!(
            "|----------|{}-------|\n",
            "---------|".repeat(breakdown.failure_labels.len())
        ));
        for (category, counts) in &breakdown.rows {
            report.push_str(&format!("| {} | ", category));
            for count in counts {
                report.push_str(&format!("{} | ", count));
            }
            report.push_str(&format!("{} |\n", counts.iter().sum::<usize>()));
        }
    }

    if !negative.by_category.is_empty() {
        report.push_str("\n### Negative Feedback by Category\n| Category | Negative Feedback Count |\n|----------|------------------------|\n");
        for (category, count) in negative.by_category.iter().take(5) {
            report.push_str(&format!("| {} | {} |\n", category, count));
        }
    }

    if !negative.complaint_keywords.is_empty() {
        report.push_str("\n### Common Complaint Keywords\n| Keyword | Frequency |\n|---------|----------|\n");
        for (word, freq) in &negative.complaint_keywords {
            report.push_str(&format!("| {} | {} |\n", word, freq));
        }
    }
}

fn render_failures_by_date(report: &mut String, analysis: &FeedbackAnalysis) {
    let Some(by_date) = &analysis.failures_by_date else {
        return;
    };

    report.push_str("\n\n---\n\n## 📅 Feedback Categories by Date\n\n### Distribution of Feedback Categories Across Dates\n");
    report.push_str(&format!("| Date | {} | Total |\n", by_date.labels.join(" | ")));
    report.push_str(&format!("|------|{}------|\n", "----|".repeat(by_date.labels.len())));
    for (date, counts) in &by_date.rows {
        report.push_str(&format!("| {} | ", date));
        for count in counts {
            report.push_str(&format!("{} | ", count));
        }
        report.push_str(&format!("{} |\n", counts.iter().sum::<usize>()));
    }
}

fn render_action_items(report: &mut String, analysis: &FeedbackAnalysis) {
    let focus = analysis
        .categories
        .as_ref()
        .map(|c| format!("'{}' category", c.worst.name))
        .unwrap_or_else(|| "the lowest-rated categories".to_string());

    report.push_str("\n\n---\n\n## 📋 Action Items\n\n### Immediate Actions (Next 1-2 weeks)\n");
    report.push_str(&format!("- [ ] Review and improve responses for {}\n", focus));
    report.push_str("- [ ] Analyze specific complaints in top negative feedback categories\n");
    report.push_str("- [ ] Optimize response templates for peak usage days\n");
    report.push_str("\n### Short-term Improvements (Next 1-3 months)\n");
    report.push_str("- [ ] Implement A/B testing for response length optimization\n");
    report.push_str("- [ ] Develop category-specific response guidelines\n");
    report.push_str("- [ ] Create feedback loop mechanism for continuous improvement\n");
    report.push_str("\n### Long-term Strategy (3+ months)\n");
    report.push_str("- [ ] Implement advanced NLP for better question understanding\n");
    report.push_str("- [ ] Develop predictive models for user satisfaction\n");
    report.push_str("- [ ] Create automated quality assurance system\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
