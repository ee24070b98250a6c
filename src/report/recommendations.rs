//! Threshold-based recommendations drawn from a `FeedbackAnalysis`.

use super::analysis::FeedbackAnalysis;
use crate::record::Scenario;

const CRITICAL_SATISFACTION: f64 = 0.7;
const TARGET_SATISFACTION: f64 = 0.8;
const DOMINANT_SCENARIO_SHARE: f64 = 70.0;
const SHORT_RESPONSE_CHARS: f64 = 50.0;
const LONG_RESPONSE_CHARS: f64 = 500.0;

pub fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn generate_recommendations(analysis: &FeedbackAnalysis) -> Vec<String> {
    let mut recommendations = Vec::new();

    let satisfaction = analysis.basic.satisfaction_rate;
    if satisfaction < CRITICAL_SATISFACTION {
        recommendations.push(format!(
            "🚨 **Critical**: Overall satisfaction rate is {}, which is below the recommended 70% threshold.",
            pct(satisfaction)
        ));
    } else if satisfaction < TARGET_SATISFACTION {
        recommendations.push(format!(
            "⚠️ **Warning**: Satisfaction rate is {}. Consider improvements to reach 80%+ target.",
            pct(satisfaction)
        ));
    } else {
        recommendations.push(format!(
            "✅ **Good**: Satisfaction rate of {} is above target.",
            pct(satisfaction)
        ));
    }

    if let Some(categories) = &analysis.categories {
        recommendations.push(format!(
            "📊 Focus improvement efforts on '{}' category (satisfaction: {})",
            categories.worst.name,
            pct(categories.worst.stats.satisfaction)
        ));
        recommendations.push(format!(
            "🏆 Leverage successful patterns from '{}' category (satisfaction: {})",
            categories.best.name,
            pct(categories.best.stats.satisfaction)
        ));
    }

    if let Some(scenarios) = &analysis.temporal.scenarios {
        if let (Some(a), Some(b)) = (scenarios.stats_for(Scenario::A), scenarios.stats_for(Scenario::B)) {
            let (sat_a, sat_b) = (a.stats.satisfaction, b.stats.satisfaction);
            if sat_a > sat_b {
                recommendations.push(format!(
                    "🎯 **Scenario Analysis**: Provided questions (Scenario A) perform {} better than open-ended questions (Scenario B). Consider expanding the provided question set.",
                    pct(sat_a - sat_b)
                ));
            } else if sat_b > sat_a {
                recommendations.push(format!(
                    "💡 **Scenario Analysis**: Open-ended questions (Scenario B) perform {} better than provided questions (Scenario A). Users may prefer more flexibility in question types.",
                    pct(sat_b - sat_a)
                ));
            } else {
                recommendations.push(
                    "⚖️ **Scenario Analysis**: Both provided and open-ended questions show similar satisfaction rates. Current question strategy is balanced."
                        .to_string(),
                );
            }

            let total = (a.stats.interactions + b.stats.interactions) as f64;
            let share_a = a.stats.interactions as f64 / total * 100.0;
            let share_b = b.stats.interactions as f64 / total * 100.0;
            if share_a > DOMINANT_SCENARIO_SHARE {
                recommendations.push(format!(
                    "📋 **Question Distribution**: {:.1}% of questions are from provided set. Consider monitoring if users need more diverse question options.",
                    share_a
                ));
            } else if share_b > DOMINANT_SCENARIO_SHARE {
                recommendations.push(format!(
                    "🔍 **Question Distribution**: {:.1}% of questions are open-ended. Consider expanding the provided question set to cover more user needs.",
                    share_b
                ));
            }
        }
    }

    if let Some(peak) = analysis.temporal.peak_date {
        recommendations.push(format!(
            "📅 **Peak Usage**: Highest activity on {} during the analyzed period.",
            peak
        ));
    }

    let avg_length = analysis.content.avg_response_length;
    if avg_length < SHORT_RESPONSE_CHARS {
        recommendations.push(
            "📝 **Content**: Responses may be too brief. Consider providing more detailed answers.".to_string(),
        );
    } else if avg_length > LONG_RESPONSE_CHARS {
        recommendations.push(
            "📝 **Content**: Responses may be too lengthy. Consider more concise answers.".to_string(),
        );
    }

    if let Some((category, _)) = analysis.negative.by_category.first() {
        recommendations.push(format!(
            "🔧 **Fix**: Address issues in '{}' - highest source of complaints.",
            category
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::record::{FeedbackRating, FeedbackRecord};
    use crate::report::analysis::analyze;

    fn record(time: &str, rating: FeedbackRating, scenario: Scenario, category: &str) -> FeedbackRecord {
        let mut r = FeedbackRecord::new(time, "What is FPS?", "x".repeat(120), rating);
        r.scenario = Some(scenario);
        r.category = Some(category.to_string());
        r
    }

    #[test]
    fn test_critical_with_scenario_and_complaint_lines() {
        let dataset = Dataset::new(vec![
            record("2025-06-02 10:00:00", FeedbackRating::ThumbsUp, Scenario::A, "Loans"),
            record("2025-06-02 11:00:00", FeedbackRating::ThumbsDown, Scenario::B, "Accounts"),
            record("2025-06-03 11:00:00", FeedbackRating::ThumbsDown, Scenario::B, "Accounts"),
            record("2025-06-03 12:00:00", FeedbackRating::ThumbsDown, Scenario::B, "Loans"),
        ]);
        let analysis = analyze(&dataset).unwrap();
        let recs = generate_recommendations(&analysis);

        assert!(recs[0].starts_with("🚨 **Critical**: Overall satisfaction rate is 25.0%"));
        assert!(recs.iter().any(|r| r.contains("Focus improvement efforts on 'Accounts'")));
        assert!(recs.iter().any(|r| r.contains("Provided questions (Scenario A) perform 100.0% better")));
        assert!(recs.iter().any(|r| r.contains("75.0% of questions are open-ended")));
        assert!(recs.iter().any(|r| r.contains("Highest activity on 2025-06-02")));
        assert!(recs.iter().any(|r| r.contains("Address issues in 'Accounts'")));
        assert!(!recs.iter().any(|r| r.contains("**Content**")));
    }

    #[test]
    fn test_good_satisfaction_and_brief_answers() {
        let mut r = FeedbackRecord::new("2025-06-02", "Hi", "Hello", FeedbackRating::ThumbsUp);
        r.category = Some("Loans".to_string());
        let analysis = analyze(&Dataset::new(vec![r])).unwrap();
        let recs = generate_recommendations(&analysis);
        assert!(recs[0].starts_with("✅ **Good**"));
        assert!(recs.iter().any(|r| r.contains("too brief")));
    }
}
