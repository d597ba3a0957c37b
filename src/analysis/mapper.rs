//! Pure mapping from raw predictions to domain records.
//!
//! Deterministic given its input: keyword groups resolve each label to one
//! of six canonical conditions, confidence is boosted and capped, severity
//! comes from the threshold ladder over the raw score, and advice lists are
//! looked up from fixed tables.

use crate::backend::{RawClassification, RawDetection};
use crate::models::{DetectedFeature, Severity, SkinCondition, SkinType};

/// Only the top K classifications are mapped.
pub const CLASSIFICATION_TOP_K: usize = 5;
/// Prediction scores are scaled by this before display.
pub const CONFIDENCE_BOOST: f32 = 1.2;
/// Displayed confidence never exceeds this.
pub const CONFIDENCE_CAP: f32 = 0.95;

/// Label used when no keyword group matches.
pub const GENERIC_CONDITION: &str = "General Skin Analysis";

/// Keyword groups in priority order; the first matching group wins.
const KEYWORD_GROUPS: &[(&[&str], &str)] = &[
    (&["redness", "inflam", "irritat", "rosacea"], "Redness & Irritation"),
    (&["dark spot", "spot", "patch", "pigment"], "Hyperpigmentation"),
    (&["rough", "texture", "uneven"], "Uneven Texture"),
    (&["dry", "flak"], "Dryness"),
    (&["oily", "shiny", "sebum", "greas"], "Excess Oil"),
    (&["acne", "pimple", "blemish", "breakout"], "Acne"),
];

// ---------------------------------------------------------------------------
// Classification mapping
// ---------------------------------------------------------------------------

/// Map the top-K classification predictions to skin conditions.
pub fn map_classifications(predictions: &[RawClassification]) -> Vec<SkinCondition> {
    predictions
        .iter()
        .take(CLASSIFICATION_TOP_K)
        .map(|p| {
            let condition = canonical_condition(&p.label);
            SkinCondition {
                condition: condition.to_string(),
                severity: Severity::from_confidence(p.score),
                confidence: boosted_confidence(p.score),
                recommendations: recommendations_for(condition)
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
            }
        })
        .collect()
}

/// Resolve a label to its canonical condition name.
pub fn canonical_condition(label: &str) -> &'static str {
    let label = label.to_lowercase();
    for (keywords, condition) in KEYWORD_GROUPS {
        if keywords.iter().any(|k| label.contains(k)) {
            return condition;
        }
    }
    GENERIC_CONDITION
}

/// Scale a raw score by the boost factor and clamp it to [0, cap].
pub fn boosted_confidence(score: f32) -> f32 {
    (score * CONFIDENCE_BOOST).clamp(0.0, CONFIDENCE_CAP)
}

/// Fixed advice list per canonical condition. Unmapped names get a generic
/// two-item fallback.
pub fn recommendations_for(condition: &str) -> &'static [&'static str] {
    match condition {
        "Acne" => &[
            "Cleanse twice daily with a gentle, non-comedogenic cleanser",
            "Introduce a salicylic acid or benzoyl peroxide treatment gradually",
            "Avoid touching your face during the day",
        ],
        "Redness & Irritation" => &[
            "Strip the routine back to a gentle cleanser and fragrance-free moisturizer",
            "Patch-test new products on the inner forearm first",
            "Avoid hot water when washing your face",
        ],
        "Hyperpigmentation" => &[
            "Apply broad-spectrum SPF 30+ every morning, even indoors",
            "Add a vitamin C serum to your morning routine",
        ],
        "Uneven Texture" => &[
            "Exfoliate gently with an AHA two times a week",
            "Keep skin consistently moisturized to support turnover",
        ],
        "Dryness" => &[
            "Layer a hyaluronic acid serum under a ceramide moisturizer",
            "Run a humidifier in the rooms you spend the most time in",
            "Skip foaming cleansers in favor of cream or oil formulas",
        ],
        "Excess Oil" => &[
            "Use a lightweight gel moisturizer — skipping moisturizer increases oil production",
            "Blotting papers midday beat repeated washing",
        ],
        "Fine Lines" => &[
            "Start a retinoid at low strength two nights a week",
            "Daily sunscreen is the most effective anti-aging step",
        ],
        _ => &[
            "Maintain a consistent daily cleansing and moisturizing routine",
            "Consult a dermatologist for a personalized assessment",
        ],
    }
}

// ---------------------------------------------------------------------------
// Detection mapping
// ---------------------------------------------------------------------------

/// Map detection predictions to detected features. Confidence passes through
/// unchanged; count defaults to 1.
pub fn map_detections(predictions: &[RawDetection]) -> Vec<DetectedFeature> {
    predictions
        .iter()
        .map(|p| DetectedFeature {
            label: detection_label(&p.label),
            confidence: p.score,
            count: Some(1),
            bounding_box: p.bounding_box,
        })
        .collect()
}

fn detection_label(label: &str) -> String {
    let lower = label.to_lowercase();
    if ["person", "face", "head"].iter().any(|k| lower.contains(k)) {
        "Facial Area Detected".to_string()
    } else if ["eye", "nose", "mouth"].iter().any(|k| lower.contains(k)) {
        format!("Facial Feature: {label}")
    } else {
        format!("Detected Object: {label}")
    }
}

// ---------------------------------------------------------------------------
// Skin type inference
// ---------------------------------------------------------------------------

/// Derive the overall skin type from the top classification labels.
/// Deterministic: the first matching keyword wins, else Normal.
pub fn infer_skin_type(predictions: &[RawClassification]) -> SkinType {
    for p in predictions.iter().take(CLASSIFICATION_TOP_K) {
        let label = p.label.to_lowercase();
        if label.contains("dry") {
            return SkinType::Dry;
        }
        if label.contains("oily") || label.contains("shiny") {
            return SkinType::Oily;
        }
        if label.contains("sensitiv") || label.contains("redness") {
            return SkinType::Sensitive;
        }
        if label.contains("combination") {
            return SkinType::Combination;
        }
    }
    SkinType::Normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    fn prediction(label: &str, score: f32) -> RawClassification {
        RawClassification {
            label: label.into(),
            score,
        }
    }

    #[test]
    fn confidence_boost_caps_at_095() {
        // 0.95 / 1.2 is about 0.7917, so anything at or above saturates the cap.
        assert_eq!(boosted_confidence(0.80), 0.95);
        assert_eq!(boosted_confidence(1.0), 0.95);
        assert!((boosted_confidence(0.5) - 0.6).abs() < 1e-6);
        assert_eq!(boosted_confidence(0.0), 0.0);
    }

    #[test]
    fn severity_comes_from_raw_score_not_boosted() {
        // Raw 0.7 boosts to 0.84, but the ladder sees the raw score.
        let conditions = map_classifications(&[prediction("acne vulgaris", 0.7)]);
        assert_eq!(conditions[0].severity, Severity::Moderate);
        assert!((conditions[0].confidence - 0.84).abs() < 1e-6);
    }

    #[test]
    fn first_matching_keyword_group_wins() {
        // Matches both the redness group and the acne group; redness has
        // higher priority.
        assert_eq!(
            canonical_condition("redness around acne lesions"),
            "Redness & Irritation"
        );
        assert_eq!(canonical_condition("Cystic Acne"), "Acne");
        assert_eq!(canonical_condition("dark spots on cheek"), "Hyperpigmentation");
    }

    #[test]
    fn unmatched_label_falls_back_to_generic() {
        let conditions = map_classifications(&[prediction("healthy glow", 0.3)]);
        assert_eq!(conditions[0].condition, GENERIC_CONDITION);
        assert_eq!(conditions[0].recommendations.len(), 2);
    }

    #[test]
    fn only_top_k_predictions_are_mapped() {
        let predictions: Vec<_> = (0..8)
            .map(|i| prediction("oily skin", 0.9 - i as f32 * 0.1))
            .collect();
        assert_eq!(map_classifications(&predictions).len(), CLASSIFICATION_TOP_K);
    }

    #[test]
    fn every_mapped_condition_has_advice() {
        for label in [
            "acne", "redness", "dark spots", "rough texture", "dry skin", "oily skin", "unknown",
        ] {
            let conditions = map_classifications(&[prediction(label, 0.6)]);
            assert!(!conditions[0].recommendations.is_empty());
        }
    }

    #[test]
    fn detection_labels_map_by_keyword() {
        let detections = map_detections(&[
            RawDetection {
                label: "person".into(),
                score: 0.91,
                bounding_box: Some(BoundingBox {
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 120.0,
                }),
            },
            RawDetection {
                label: "left eye".into(),
                score: 0.84,
                bounding_box: None,
            },
            RawDetection {
                label: "bottle".into(),
                score: 0.40,
                bounding_box: None,
            },
        ]);

        assert_eq!(detections[0].label, "Facial Area Detected");
        assert_eq!(detections[1].label, "Facial Feature: left eye");
        assert_eq!(detections[2].label, "Detected Object: bottle");
        // Confidence passes through unchanged, count defaults to 1.
        assert_eq!(detections[0].confidence, 0.91);
        assert_eq!(detections[2].count, Some(1));
    }

    #[test]
    fn skin_type_inference_is_keyword_driven() {
        assert_eq!(infer_skin_type(&[prediction("dry flaky skin", 0.8)]), SkinType::Dry);
        assert_eq!(infer_skin_type(&[prediction("oily t-zone", 0.8)]), SkinType::Oily);
        assert_eq!(
            infer_skin_type(&[prediction("redness and sensitivity", 0.8)]),
            SkinType::Sensitive
        );
        assert_eq!(infer_skin_type(&[prediction("clear complexion", 0.8)]), SkinType::Normal);
        assert_eq!(infer_skin_type(&[]), SkinType::Normal);
    }
}
