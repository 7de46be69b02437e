use serde::{Deserialize, Serialize};

/// A verified building product with its per-unit carbon factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// kg CO2e per declared unit (GWP, A1-A3).
    pub carbon_factor: f64,
    #[serde(default)]
    pub declared_unit: String,
}

/// Filter for catalog listings. All fields are optional; an empty query
/// returns the full catalog sorted by carbon factor.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Case-insensitive containment match against name, category and
    /// description.
    pub term: Option<String>,
    pub category: Option<String>,
    pub max_carbon_factor: Option<f64>,
    pub limit: Option<usize>,
}

impl CatalogQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_max_carbon_factor(mut self, ceiling: f64) -> Self {
        self.max_carbon_factor = Some(ceiling);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
