//! Domain data model for skin analysis.
//!
//! `AnalysisResult` is the JSON contract handed to every collaborator
//! (analysis screen, chat formatter, journal). It is created once per
//! `analyze()` call and never mutated in place after being returned;
//! enrichment works on a deep copy.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

pub mod enums;

pub use enums::{Impact, ModelSlot, Severity, SkinType};

/// Raised when a stored string does not match any enum variant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// SkinCondition
// ---------------------------------------------------------------------------

/// One assessed skin condition with its advice list.
///
/// Confidence stays in [0,1]. Severity is derived from the raw prediction
/// score via the threshold ladder, never randomized independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinCondition {
    pub condition: String,
    pub severity: Severity,
    pub confidence: f32,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// DetectedFeature
// ---------------------------------------------------------------------------

/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One object-detection hit, immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFeature {
    pub label: String,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

// ---------------------------------------------------------------------------
// EnvironmentalFactor
// ---------------------------------------------------------------------------

/// Per-analysis environmental context. Generated independently of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalFactor {
    pub factor: String,
    pub impact: Impact,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// SubtypeDistribution
// ---------------------------------------------------------------------------

/// Confidence per member of a fixed taxonomy (e.g. acne types).
///
/// Preserves insertion order so argmax ties resolve deterministically to the
/// first maximum encountered. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtypeDistribution {
    entries: Vec<(String, f32)>,
}

impl SubtypeDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut dist = Self::new();
        for (name, confidence) in pairs {
            dist.set(name.into(), confidence);
        }
        dist
    }

    /// Insert or replace a member's confidence. New members go last.
    pub fn set(&mut self, name: impl Into<String>, confidence: f32) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = confidence,
            None => self.entries.push((name, confidence)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Argmax member. Ties break to the first maximum in insertion order.
    pub fn primary(&self) -> Option<(&str, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for (name, confidence) in self.iter() {
            match best {
                Some((_, top)) if confidence <= top => {}
                _ => best = Some((name, confidence)),
            }
        }
        best
    }
}

impl Serialize for SubtypeDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, confidence) in &self.entries {
            map.serialize_entry(name, confidence)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubtypeDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistVisitor;

        impl<'de> Visitor<'de> for DistVisitor {
            type Value = SubtypeDistribution;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of subtype name to confidence")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut dist = SubtypeDistribution::new();
                while let Some((name, confidence)) = access.next_entry::<String, f32>()? {
                    dist.set(name, confidence);
                }
                Ok(dist)
            }
        }

        deserializer.deserialize_map(DistVisitor)
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// The aggregate analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub skin_type: SkinType,
    /// One-paragraph descriptive summary.
    pub overall: String,
    pub conditions: Vec<SkinCondition>,
    /// True only when the full model path produced this report.
    pub used_advanced_models: bool,
    pub detected_objects: Vec<DetectedFeature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acne_types: Option<SubtypeDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrinkle_types: Option<SubtypeDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pigmentation_types: Option<SubtypeDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_types: Option<SubtypeDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pore_types: Option<SubtypeDistribution>,
    pub environmental_factors: Vec<EnvironmentalFactor>,
}

impl AnalysisResult {
    /// Fresh result shell with a new id and timestamp. Lists start empty and
    /// distributions absent; the pipeline fills what each path produces.
    pub fn new(skin_type: SkinType, overall: impl Into<String>, used_advanced_models: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            skin_type,
            overall: overall.into(),
            conditions: Vec::new(),
            used_advanced_models,
            detected_objects: Vec::new(),
            acne_types: None,
            wrinkle_types: None,
            pigmentation_types: None,
            texture_types: None,
            pore_types: None,
            environmental_factors: Vec::new(),
        }
    }

    /// Find a condition by its exact current label.
    pub fn condition_mut(&mut self, name: &str) -> Option<&mut SkinCondition> {
        self.conditions.iter_mut().find(|c| c.condition == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_primary_is_argmax() {
        let dist = SubtypeDistribution::from_pairs([
            ("hormonal", 0.9),
            ("cystic", 0.3),
            ("comedonal", 0.5),
            ("fungal", 0.1),
        ]);
        assert_eq!(dist.primary(), Some(("hormonal", 0.9)));
    }

    #[test]
    fn distribution_tie_breaks_to_first_inserted() {
        let dist = SubtypeDistribution::from_pairs([
            ("melasma", 0.6),
            ("freckles", 0.6),
            ("sun spots", 0.2),
        ]);
        assert_eq!(dist.primary().map(|(n, _)| n), Some("melasma"));
    }

    #[test]
    fn distribution_set_replaces_in_place() {
        let mut dist = SubtypeDistribution::from_pairs([("rough", 0.2), ("bumpy", 0.4)]);
        dist.set("rough", 0.8);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get("rough"), Some(0.8));
        // First insertion position kept, so the tie-break order is stable.
        assert_eq!(dist.iter().next().map(|(n, _)| n), Some("rough"));
    }

    #[test]
    fn distribution_serializes_as_json_object() {
        let dist = SubtypeDistribution::from_pairs([("hormonal", 0.5), ("fungal", 0.25)]);
        let value = serde_json::to_value(&dist).unwrap();
        assert_eq!(value["hormonal"], 0.5);
        assert_eq!(value["fungal"], 0.25);

        let back: SubtypeDistribution = serde_json::from_value(value).unwrap();
        assert_eq!(back.get("hormonal"), Some(0.5));
    }

    #[test]
    fn result_shell_starts_empty() {
        let result = AnalysisResult::new(SkinType::Normal, "All clear.", false);
        assert!(result.conditions.is_empty());
        assert!(result.acne_types.is_none());
        assert!(!result.used_advanced_models);
    }

    #[test]
    fn result_json_uses_camel_case_contract() {
        let result = AnalysisResult::new(SkinType::Combination, "ok", true);
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("usedAdvancedModels").is_some());
        assert!(value.get("environmentalFactors").is_some());
        assert_eq!(value["skinType"], "combination");
        // Absent distributions are omitted, not null.
        assert!(value.get("acneTypes").is_none());
    }
}
