use carbonlens_protocol::MatchKind;
use serde::{Deserialize, Serialize};

/// One material to look up: the free-text name extracted from the model
/// plus the category the model declared for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialQuery {
    pub name: String,
    pub category: String,
}

impl MaterialQuery {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// The best catalog product found for a material.
///
/// Absence of a match is expressed as `Option::None` by the matcher, not
/// by a variant here; a value of this type always refers to a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialMatch {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    /// kg CO2e per declared unit of the matched product.
    pub carbon_factor: f64,
    /// 1 − match distance, in [0, 1].
    pub confidence: f64,
    pub match_type: MatchKind,
    pub reasons: Vec<String>,
}
