//! Weighted multi-field fuzzy matching of one material name against a
//! slice of catalog candidates.
//!
//! This is a pure function: candidates are supplied by the caller, nothing
//! is cached, and "no good match" is a normal `None` result rather than an
//! error. Candidate loading and concurrency live in [`crate::batch`].

use crate::similarity::field_similarity;
use crate::types::{MaterialMatch, MaterialQuery};
use carbonlens_catalog::Product;
use carbonlens_protocol::MatchKind;

/// Field weights; they sum to 1 and act as exponents on per-field
/// distances, so a strong match on a heavy field dominates.
const NAME_WEIGHT: f64 = 0.5;
const CATEGORY_WEIGHT: f64 = 0.3;
const DESCRIPTION_WEIGHT: f64 = 0.2;

/// Accept matches within this distance (1 − weighted similarity).
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.4;

/// Confidence above which a match counts as strong textual similarity.
const STRONG_MATCH_CONFIDENCE: f64 = 0.8;

/// Floor on a matched field's distance so a perfect field never collapses
/// the whole product to zero.
const MIN_FIELD_DISTANCE: f64 = 1e-3;

/// Per-call knobs for [`match_material`].
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Category declared by the model; used for the `Category`
    /// classification, never as a hard filter.
    pub category_hint: Option<String>,
    /// Hard filter: only consider candidates whose category contains this.
    pub category_filter: Option<String>,
    /// Only consider candidates at or below this carbon factor.
    pub max_carbon_factor: Option<f64>,
    pub distance_threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            category_hint: None,
            category_filter: None,
            max_carbon_factor: None,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

impl MatchOptions {
    pub fn with_category_hint(mut self, hint: impl Into<String>) -> Self {
        self.category_hint = Some(hint.into());
        self
    }

    pub fn with_category_filter(mut self, filter: impl Into<String>) -> Self {
        self.category_filter = Some(filter.into());
        self
    }

    pub fn with_max_carbon_factor(mut self, ceiling: f64) -> Self {
        self.max_carbon_factor = Some(ceiling);
        self
    }

    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    pub fn for_query(query: &MaterialQuery) -> Self {
        Self::default().with_category_hint(query.category.clone())
    }
}

/// Find the best catalog product for `name`.
///
/// Classification order decides ties: exactness always wins, then strong
/// similarity, then category corroboration.
pub fn match_material(
    name: &str,
    options: &MatchOptions,
    candidates: &[Product],
) -> Option<MaterialMatch> {
    let eligible: Vec<&Product> = candidates
        .iter()
        .filter(|p| is_eligible(p, options))
        .collect();

    if eligible.is_empty() {
        return None;
    }

    // Exactness wins regardless of how the other fields would score.
    let lowered = name.to_lowercase();
    if let Some(product) = eligible
        .iter()
        .copied()
        .find(|p| p.name.to_lowercase() == lowered)
    {
        return Some(MaterialMatch {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            category: product.category.clone(),
            carbon_factor: product.carbon_factor,
            confidence: 1.0,
            match_type: MatchKind::Exact,
            reasons: vec!["exact name match".to_string()],
        });
    }

    let mut best: Option<(f64, &Product, Vec<String>)> = None;
    for &product in &eligible {
        let (distance, reasons) = candidate_distance(name, product);
        if distance > options.distance_threshold {
            continue;
        }
        // Strictly-less keeps the first candidate on ties.
        if best.as_ref().map_or(true, |(d, _, _)| distance < *d) {
            best = Some((distance, product, reasons));
        }
    }

    let (distance, product, mut reasons) = best?;
    let confidence = 1.0 - distance;

    let match_type = if confidence > STRONG_MATCH_CONFIDENCE {
        MatchKind::Fuzzy
    } else if let Some(hint) = options
        .category_hint
        .as_deref()
        .filter(|h| category_overlaps(h, &product.category))
    {
        reasons.push(format!("category overlaps hint '{hint}'"));
        MatchKind::Category
    } else {
        MatchKind::Fuzzy
    };

    Some(MaterialMatch {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        category: product.category.clone(),
        carbon_factor: product.carbon_factor,
        confidence,
        match_type,
        reasons,
    })
}

fn is_eligible(product: &Product, options: &MatchOptions) -> bool {
    if let Some(filter) = &options.category_filter {
        if !product
            .category
            .to_lowercase()
            .contains(&filter.to_lowercase())
        {
            return false;
        }
    }
    if let Some(ceiling) = options.max_carbon_factor {
        if product.carbon_factor > ceiling {
            return false;
        }
    }
    true
}

/// Weighted distance of one candidate, with the per-field reasons.
///
/// Matched fields multiply their distance raised to the field weight;
/// fields with no match contribute nothing. A perfect single-field match
/// therefore pulls the product far down without reaching zero.
fn candidate_distance(name: &str, product: &Product) -> (f64, Vec<String>) {
    let fields = [
        ("name", &product.name, NAME_WEIGHT),
        ("category", &product.category, CATEGORY_WEIGHT),
        ("description", &product.description, DESCRIPTION_WEIGHT),
    ];

    let mut distance = 1.0;
    let mut reasons = Vec::new();

    for (label, value, weight) in fields {
        let sim = field_similarity(name, value);
        if sim <= 0.0 {
            continue;
        }
        let field_distance = (1.0 - sim).max(MIN_FIELD_DISTANCE);
        distance *= field_distance.powf(weight);
        reasons.push(format!("{label} similarity {sim:.2}"));
    }

    (distance, reasons)
}

fn category_overlaps(hint: &str, category: &str) -> bool {
    let hint = hint.trim().to_lowercase();
    let category = category.trim().to_lowercase();
    if hint.is_empty() || category.is_empty() {
        return false;
    }
    hint.contains(&category) || category.contains(&hint)
}
