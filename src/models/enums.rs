use serde::{Deserialize, Serialize};

use super::InvalidEnum;

// ---------------------------------------------------------------------------
// SkinType
// ---------------------------------------------------------------------------

/// Overall skin classification shown at the top of every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Normal,
    Sensitive,
}

impl SkinType {
    pub const ALL: [SkinType; 5] = [
        Self::Dry,
        Self::Oily,
        Self::Combination,
        Self::Normal,
        Self::Sensitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Oily => "oily",
            Self::Combination => "combination",
            Self::Normal => "normal",
            Self::Sensitive => "sensitive",
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Condition severity. Ordering follows variant order (Low < High).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Mild,
    Moderate,
    High,
}

impl Severity {
    /// Threshold ladder over a raw prediction score. Comparisons are strict:
    /// exactly 0.7 is Moderate, exactly 0.4 is Low.
    pub fn from_confidence(score: f32) -> Self {
        if score > 0.7 {
            Self::High
        } else if score > 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

// ---------------------------------------------------------------------------
// Impact
// ---------------------------------------------------------------------------

/// Environmental factor impact level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

// ---------------------------------------------------------------------------
// ModelSlot
// ---------------------------------------------------------------------------

/// One named logical model tracked independently by the load coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelSlot {
    General,
    CnnClassification,
    YoloDetection,
    WrinkleDetection,
    PigmentationAnalysis,
    SkinTextureAnalysis,
    PoreAnalysis,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 7] = [
        Self::General,
        Self::CnnClassification,
        Self::YoloDetection,
        Self::WrinkleDetection,
        Self::PigmentationAnalysis,
        Self::SkinTextureAnalysis,
        Self::PoreAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::CnnClassification => "cnn-classification",
            Self::YoloDetection => "yolo-detection",
            Self::WrinkleDetection => "wrinkle-detection",
            Self::PigmentationAnalysis => "pigmentation-analysis",
            Self::SkinTextureAnalysis => "skin-texture-analysis",
            Self::PoreAnalysis => "pore-analysis",
        }
    }

    /// Slots backed by the real inference library. Everything else is a
    /// staged warm-up delay.
    pub fn requires_backend(&self) -> bool {
        matches!(self, Self::CnnClassification | Self::YoloDetection)
    }
}

impl std::fmt::Display for ModelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelSlot {
    type Err = InvalidEnum;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| InvalidEnum {
                field: "ModelSlot".into(),
                value: s.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ladder_boundaries_are_strict() {
        assert_eq!(Severity::from_confidence(0.7), Severity::Moderate);
        assert_eq!(Severity::from_confidence(0.71), Severity::High);
        assert_eq!(Severity::from_confidence(0.4), Severity::Low);
        assert_eq!(Severity::from_confidence(0.41), Severity::Moderate);
        assert_eq!(Severity::from_confidence(0.0), Severity::Low);
        assert_eq!(Severity::from_confidence(1.0), Severity::High);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Mild);
        assert!(Severity::Mild < Severity::Moderate);
        assert!(Severity::Moderate < Severity::High);
    }

    #[test]
    fn slot_round_trips_through_str() {
        for slot in ModelSlot::ALL {
            assert_eq!(slot.as_str().parse::<ModelSlot>().unwrap(), slot);
        }
        assert!("unknown-model".parse::<ModelSlot>().is_err());
    }

    #[test]
    fn only_advanced_slots_require_the_backend() {
        let advanced: Vec<_> = ModelSlot::ALL
            .into_iter()
            .filter(ModelSlot::requires_backend)
            .collect();
        assert_eq!(
            advanced,
            vec![ModelSlot::CnnClassification, ModelSlot::YoloDetection]
        );
    }

    #[test]
    fn slot_serializes_kebab_case() {
        let json = serde_json::to_string(&ModelSlot::CnnClassification).unwrap();
        assert_eq!(json, "\"cnn-classification\"");
    }
}
