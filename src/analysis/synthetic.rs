//! Randomized stand-ins for model outputs.
//!
//! Two pluggable strategy seams: `AuxiliaryDataSource` fills the parts of an
//! advanced report no real model produces yet (subtype distributions,
//! environmental factors), and `FallbackGenerator` produces a complete
//! report when the model path is unavailable. Both have randomized default
//! implementations; a real model integration implements the same trait
//! without touching pipeline logic.
//!
//! None of this is derived from the image; it is explicitly placeholder
//! data, marked as such by `used_advanced_models = false` on fallback.

use rand::seq::SliceRandom;
use rand::Rng;

use super::taxonomy::{self, Taxonomy};
use crate::analysis::types::AnalysisFailure;
use crate::models::{
    AnalysisResult, EnvironmentalFactor, Impact, Severity, SkinCondition, SkinType,
    SubtypeDistribution,
};

// ---------------------------------------------------------------------------
// Strategy seams
// ---------------------------------------------------------------------------

/// All five subtype distributions for one analysis.
#[derive(Debug, Clone)]
pub struct SubtypeProfile {
    pub acne: SubtypeDistribution,
    pub wrinkle: SubtypeDistribution,
    pub pigmentation: SubtypeDistribution,
    pub texture: SubtypeDistribution,
    pub pore: SubtypeDistribution,
}

/// Produces the auxiliary data merged into every advanced report.
pub trait AuxiliaryDataSource: Send + Sync {
    fn subtype_profile(&self) -> SubtypeProfile;
    fn environmental_factors(&self) -> Vec<EnvironmentalFactor>;
}

/// Produces a complete report when the model path fails.
pub trait FallbackGenerator: Send + Sync {
    fn generate(&self) -> Result<AnalysisResult, AnalysisFailure>;
}

// ---------------------------------------------------------------------------
// Environmental factors
// ---------------------------------------------------------------------------

const ENVIRONMENTAL_FACTORS: &[(&str, &[&str])] = &[
    (
        "Humidity",
        &[
            "In dry air, switch to a richer moisturizer and reapply during the day",
            "A bedroom humidifier helps skin recover overnight",
        ],
    ),
    (
        "UV Exposure",
        &[
            "Apply broad-spectrum SPF 30+ as the last step of your morning routine",
            "Reapply sunscreen every two hours when outdoors",
            "Seek shade between 10am and 4pm",
        ],
    ),
    (
        "Air Pollution",
        &[
            "Double-cleanse in the evening to remove particulate buildup",
            "Antioxidant serums help counter pollution-driven stress",
        ],
    ),
];

/// The three fixed factors with a weighted random impact draw
/// (40% low, 40% medium, 20% high).
pub fn random_environmental_factors<R: Rng>(rng: &mut R) -> Vec<EnvironmentalFactor> {
    ENVIRONMENTAL_FACTORS
        .iter()
        .map(|(factor, recommendations)| {
            let roll: f32 = rng.gen();
            let impact = if roll < 0.4 {
                Impact::Low
            } else if roll < 0.8 {
                Impact::Medium
            } else {
                Impact::High
            };
            EnvironmentalFactor {
                factor: (*factor).to_string(),
                impact,
                recommendations: recommendations.iter().map(|s| (*s).to_string()).collect(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Subtype distributions
// ---------------------------------------------------------------------------

/// Draw each member's confidence uniformly within its fixed range.
fn random_distribution<R: Rng>(rng: &mut R, taxonomy: &Taxonomy) -> SubtypeDistribution {
    SubtypeDistribution::from_pairs(
        taxonomy
            .members
            .iter()
            .map(|member| (member.name, rng.gen_range(member.range.0..=member.range.1))),
    )
}

/// Default randomized auxiliary source.
#[derive(Debug, Default)]
pub struct RandomizedAuxiliary;

impl AuxiliaryDataSource for RandomizedAuxiliary {
    fn subtype_profile(&self) -> SubtypeProfile {
        let mut rng = rand::thread_rng();
        SubtypeProfile {
            acne: random_distribution(&mut rng, &taxonomy::ACNE),
            wrinkle: random_distribution(&mut rng, &taxonomy::WRINKLE),
            pigmentation: random_distribution(&mut rng, &taxonomy::PIGMENTATION),
            texture: random_distribution(&mut rng, &taxonomy::TEXTURE),
            pore: random_distribution(&mut rng, &taxonomy::PORE),
        }
    }

    fn environmental_factors(&self) -> Vec<EnvironmentalFactor> {
        random_environmental_factors(&mut rand::thread_rng())
    }
}

// ---------------------------------------------------------------------------
// Fallback report
// ---------------------------------------------------------------------------

/// The fixed pool the fallback report draws its conditions from.
pub const FALLBACK_CONDITION_POOL: &[&str] =
    &["Acne", "Dryness", "Hyperpigmentation", "Fine Lines"];

/// Default randomized fallback: random skin type, a random 2–3 condition
/// subset of the fixed pool, severity derived from the drawn confidence.
#[derive(Debug, Default)]
pub struct RandomizedFallback;

impl FallbackGenerator for RandomizedFallback {
    fn generate(&self) -> Result<AnalysisResult, AnalysisFailure> {
        let mut rng = rand::thread_rng();

        let skin_type = *SkinType::ALL
            .choose(&mut rng)
            .ok_or_else(|| AnalysisFailure::new("empty skin type set"))?;

        let count = rng.gen_range(2..=3);
        let conditions: Vec<SkinCondition> = FALLBACK_CONDITION_POOL
            .choose_multiple(&mut rng, count)
            .map(|name| {
                let confidence = rng.gen_range(0.55..0.90);
                SkinCondition {
                    condition: (*name).to_string(),
                    severity: Severity::from_confidence(confidence),
                    confidence,
                    recommendations: super::mapper::recommendations_for(name)
                        .iter()
                        .map(|s| (*s).to_string())
                        .collect(),
                }
            })
            .collect();

        let overall = format!(
            "Based on a general assessment your skin appears {}. \
             {} areas are worth keeping an eye on.",
            skin_type.as_str(),
            conditions.len(),
        );

        let mut result = AnalysisResult::new(skin_type, overall, false);
        result.conditions = conditions;
        Ok(result)
    }
}
