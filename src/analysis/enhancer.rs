//! Post-analysis enrichment.
//!
//! Picks the primary subtype per rewritable taxonomy and rewrites the
//! matching base condition's label and advice. Pure transformation: no I/O,
//! no randomness, and the caller's result is never touched. Everything
//! happens on a deep copy taken at entry.

use super::taxonomy::{self, Taxonomy};
use crate::models::{AnalysisResult, SubtypeDistribution};

/// Enrich a result with primary-subtype labels.
///
/// Basic (fallback) results pass through as an unmodified copy. For advanced
/// results, each present taxonomy's argmax member rewrites its base
/// condition; a missing base condition is a no-op for that taxonomy, not an
/// error.
pub fn enhance(result: &AnalysisResult) -> AnalysisResult {
    let mut enhanced = result.clone();
    if !enhanced.used_advanced_models {
        return enhanced;
    }

    apply_taxonomy(&mut enhanced, result.acne_types.as_ref(), &taxonomy::ACNE);
    apply_taxonomy(&mut enhanced, result.wrinkle_types.as_ref(), &taxonomy::WRINKLE);
    apply_taxonomy(
        &mut enhanced,
        result.pigmentation_types.as_ref(),
        &taxonomy::PIGMENTATION,
    );
    enhanced
}

fn apply_taxonomy(
    result: &mut AnalysisResult,
    distribution: Option<&SubtypeDistribution>,
    taxonomy: &Taxonomy,
) {
    let Some(distribution) = distribution else {
        return;
    };
    let Some((primary, confidence)) = distribution.primary() else {
        return;
    };
    let Some(base) = taxonomy.base_condition else {
        return;
    };
    let Some(advice) = taxonomy::subtype_recommendations(taxonomy, primary) else {
        return;
    };

    if let Some(condition) = result.condition_mut(base) {
        tracing::debug!(
            taxonomy = taxonomy.key,
            primary,
            confidence,
            "rewriting base condition with primary subtype"
        );
        condition.condition = format!("{base} (primarily {primary})");
        condition.recommendations = advice.iter().map(|s| (*s).to_string()).collect();
    }
}
