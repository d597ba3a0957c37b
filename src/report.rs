//! Natural-language rendering of analysis results.
//!
//! The chat collaborator displays these strings verbatim, so the framing is
//! calm and preparatory: observations, not diagnoses.

use crate::models::{AnalysisResult, Severity, SkinCondition, SkinType};

/// Template builder for result text.
pub struct ReportTemplates;

impl ReportTemplates {
    /// One-paragraph overall summary used for the report header.
    pub fn overall(skin_type: SkinType, conditions: &[SkinCondition]) -> String {
        let notable = conditions
            .iter()
            .filter(|c| c.severity >= Severity::Moderate)
            .count();
        match notable {
            0 => format!(
                "Your skin appears {} with nothing that stands out today. \
                 Keeping up your current routine looks like the right move.",
                skin_type.as_str(),
            ),
            1 => format!(
                "Your skin appears {}. One area looks worth a closer look — \
                 details below.",
                skin_type.as_str(),
            ),
            n => format!(
                "Your skin appears {}. {} areas look worth a closer look — \
                 details below.",
                skin_type.as_str(),
                n,
            ),
        }
    }

    /// One line per condition for the chat summary.
    pub fn condition_line(condition: &SkinCondition) -> String {
        let advice = condition
            .recommendations
            .first()
            .map(String::as_str)
            .unwrap_or("keep an eye on it");
        format!(
            "{} ({} severity, {:.0}% confidence) — a good first step: {}",
            condition.condition,
            condition.severity.as_str(),
            condition.confidence * 100.0,
            advice,
        )
    }

    /// Full chat-facing summary of a result.
    pub fn chat_summary(result: &AnalysisResult) -> String {
        let mut lines = vec![result.overall.clone()];

        for condition in &result.conditions {
            lines.push(Self::condition_line(condition));
        }

        if !result.environmental_factors.is_empty() {
            let factors: Vec<String> = result
                .environmental_factors
                .iter()
                .map(|f| format!("{} ({} impact)", f.factor, f.impact.as_str()))
                .collect();
            lines.push(format!("Environment to keep in mind: {}.", factors.join(", ")));
        }

        if !result.used_advanced_models {
            lines.push(
                "This was a general assessment — the detailed models weren't \
                 available, so treat it as a starting point."
                    .to_string(),
            );
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, Severity, SkinCondition, SkinType};

    fn condition(name: &str, severity: Severity) -> SkinCondition {
        SkinCondition {
            condition: name.into(),
            severity,
            confidence: 0.72,
            recommendations: vec!["use sunscreen daily".into()],
        }
    }

    #[test]
    fn overall_counts_only_notable_conditions() {
        let conditions = vec![
            condition("Acne", Severity::High),
            condition("Dryness", Severity::Low),
        ];
        let text = ReportTemplates::overall(SkinType::Oily, &conditions);
        assert!(text.contains("oily"));
        assert!(text.contains("One area"));
    }

    #[test]
    fn condition_line_includes_first_advice() {
        let line = ReportTemplates::condition_line(&condition("Acne", Severity::Moderate));
        assert!(line.contains("Acne"));
        assert!(line.contains("moderate severity"));
        assert!(line.contains("72% confidence"));
        assert!(line.contains("use sunscreen daily"));
    }

    #[test]
    fn chat_summary_flags_backup_analysis() {
        let result = AnalysisResult::new(SkinType::Normal, "All clear.", false);
        let text = ReportTemplates::chat_summary(&result);
        assert!(text.contains("general assessment"));

        let advanced = AnalysisResult::new(SkinType::Normal, "All clear.", true);
        assert!(!ReportTemplates::chat_summary(&advanced).contains("general assessment"));
    }
}
