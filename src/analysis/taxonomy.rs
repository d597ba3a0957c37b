//! Static reference tables for the subtype taxonomies.
//!
//! Each taxonomy names its members (with the confidence range the synthetic
//! generator draws from), the base condition label it can rewrite, and a
//! fixed advice list per member.

/// One taxonomy member with the generator's confidence range.
#[derive(Debug, Clone, Copy)]
pub struct Subtype {
    pub name: &'static str,
    pub range: (f32, f32),
}

/// A fixed subtype taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct Taxonomy {
    pub key: &'static str,
    /// Base condition rewritten by the enhancer. None for taxonomies that
    /// only feed the distribution display.
    pub base_condition: Option<&'static str>,
    pub members: &'static [Subtype],
}

pub const ACNE: Taxonomy = Taxonomy {
    key: "acne",
    base_condition: Some("Acne"),
    members: &[
        Subtype { name: "hormonal", range: (0.30, 0.90) },
        Subtype { name: "cystic", range: (0.10, 0.60) },
        Subtype { name: "comedonal", range: (0.20, 0.80) },
        Subtype { name: "fungal", range: (0.05, 0.40) },
    ],
};

pub const WRINKLE: Taxonomy = Taxonomy {
    key: "wrinkle",
    base_condition: Some("Fine Lines"),
    members: &[
        Subtype { name: "dynamic", range: (0.25, 0.85) },
        Subtype { name: "static", range: (0.15, 0.70) },
        Subtype { name: "crow's feet", range: (0.20, 0.75) },
        Subtype { name: "forehead", range: (0.10, 0.65) },
    ],
};

pub const PIGMENTATION: Taxonomy = Taxonomy {
    key: "pigmentation",
    base_condition: Some("Hyperpigmentation"),
    members: &[
        Subtype { name: "sun spots", range: (0.25, 0.85) },
        Subtype { name: "melasma", range: (0.10, 0.60) },
        Subtype { name: "post-inflammatory", range: (0.15, 0.70) },
        Subtype { name: "freckles", range: (0.20, 0.75) },
    ],
};

pub const TEXTURE: Taxonomy = Taxonomy {
    key: "texture",
    base_condition: None,
    members: &[
        Subtype { name: "rough", range: (0.20, 0.80) },
        Subtype { name: "bumpy", range: (0.15, 0.65) },
        Subtype { name: "flaky", range: (0.10, 0.60) },
        Subtype { name: "congested", range: (0.15, 0.70) },
    ],
};

pub const PORE: Taxonomy = Taxonomy {
    key: "pore",
    base_condition: None,
    members: &[
        Subtype { name: "enlarged", range: (0.25, 0.85) },
        Subtype { name: "clogged", range: (0.20, 0.75) },
        Subtype { name: "normal", range: (0.15, 0.70) },
    ],
};

/// Advice replacing the base condition's list once a primary subtype is
/// known. Covers every member of the three rewritable taxonomies.
pub fn subtype_recommendations(taxonomy: &Taxonomy, member: &str) -> Option<&'static [&'static str]> {
    let list: &[&str] = match (taxonomy.key, member) {
        ("acne", "hormonal") => &[
            "Track breakouts against your cycle to confirm the hormonal pattern",
            "Consider asking a dermatologist about topical retinoids or spironolactone",
            "Avoid heavy, pore-clogging moisturizers along the jawline",
        ],
        ("acne", "cystic") => &[
            "Avoid squeezing — cystic lesions scar easily",
            "A dermatologist visit is worthwhile; cystic acne rarely clears with over-the-counter care",
            "Use a gentle, non-foaming cleanser twice daily",
        ],
        ("acne", "comedonal") => &[
            "Introduce a BHA (salicylic acid) exfoliant two to three times a week",
            "Switch to non-comedogenic makeup and sunscreen",
        ],
        ("acne", "fungal") => &[
            "Ordinary acne treatment will not help; look for ketoconazole-based washes",
            "Change out of sweaty clothing promptly",
        ],
        ("wrinkle", "dynamic") => &[
            "A retinoid at night softens expression lines over time",
            "Daily SPF 30+ slows further collagen breakdown",
        ],
        ("wrinkle", "static") => &[
            "Focus on hydration: hyaluronic acid serums plump static lines",
            "Ask about professional resurfacing if the lines bother you",
        ],
        ("wrinkle", "crow's feet") => &[
            "Use a dedicated eye cream with peptides morning and night",
            "Wear sunglasses outdoors to reduce squinting",
        ],
        ("wrinkle", "forehead") => &[
            "A silk pillowcase and sleeping on your back reduce overnight creasing",
            "Retinol twice a week builds tolerance before nightly use",
        ],
        ("pigmentation", "sun spots") => &[
            "Strict daily sunscreen is the single most effective step",
            "Vitamin C serum in the morning brightens existing spots",
        ],
        ("pigmentation", "melasma") => &[
            "Melasma deepens with heat and UV — favor shade and mineral sunscreen",
            "Azelaic acid is a gentle first-line brightener worth discussing",
        ],
        ("pigmentation", "post-inflammatory") => &[
            "Resist picking at active blemishes; the marks outlast the breakout",
            "Niacinamide helps fade marks left by past inflammation",
        ],
        ("pigmentation", "freckles") => &[
            "Freckles are benign; daily SPF keeps them from darkening",
            "Track any single spot that changes shape or color",
        ],
        _ => return None,
    };
    Some(list)
}
