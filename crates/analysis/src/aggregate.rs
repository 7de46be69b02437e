//! Carbon aggregation: per-material amounts, category breakdown, top
//! contributors.

use carbonlens_extractor::ExtractedMaterial;
use carbonlens_matcher::{MaterialMatch, MatchKind};
use carbonlens_protocol::{CarbonBreakdown, CategoryShare, MaterialAnalysis, TopContributor};
use std::collections::HashMap;

/// Largest contributors surfaced per analysis.
pub const TOP_CONTRIBUTOR_LIMIT: usize = 5;

/// Join extracted materials with their match outcomes into analysis rows.
///
/// An unmatched material carries factor 0: its contribution is unknown
/// rather than zero-impact, and the `none` classification records that.
pub fn material_rows(
    materials: &[ExtractedMaterial],
    matches: &HashMap<String, Option<MaterialMatch>>,
) -> Vec<MaterialAnalysis> {
    materials
        .iter()
        .map(|material| {
            let matched = matches.get(&material.name).and_then(|m| m.as_ref());
            let carbon_per_unit = matched.map(|m| m.carbon_factor).unwrap_or(0.0);

            MaterialAnalysis {
                name: material.name.clone(),
                category: material.category.clone(),
                quantity: material.quantity,
                unit: material.unit.to_string(),
                carbon_per_unit,
                total_carbon: material.quantity * carbon_per_unit,
                matched_product_id: matched.map(|m| m.product_id.clone()),
                match_confidence: matched.map(|m| m.confidence),
                match_type: matched.map(|m| m.match_type).unwrap_or(MatchKind::None),
            }
        })
        .collect()
}

/// Fold analysis rows into the breakdown document.
///
/// When the total is zero every percentage is 0, never NaN.
pub fn aggregate(rows: &[MaterialAnalysis]) -> CarbonBreakdown {
    let total_kg: f64 = rows.iter().map(|r| r.total_carbon).sum();

    let mut breakdown = CarbonBreakdown {
        total_kg,
        ..CarbonBreakdown::default()
    };

    for row in rows {
        let share = breakdown
            .by_category
            .entry(row.category.clone())
            .or_insert_with(CategoryShare::default);
        share.carbon_kg += row.total_carbon;
    }

    for share in breakdown.by_category.values_mut() {
        share.percentage = percentage(share.carbon_kg, total_kg);
    }

    // Stable sort keeps input order among equal contributors.
    let mut ranked: Vec<&MaterialAnalysis> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        b.total_carbon
            .partial_cmp(&a.total_carbon)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    breakdown.top_contributors = ranked
        .into_iter()
        .take(TOP_CONTRIBUTOR_LIMIT)
        .map(|row| TopContributor {
            material_name: row.name.clone(),
            carbon_kg: row.total_carbon,
            percentage: percentage(row.total_carbon, total_kg),
        })
        .collect();

    breakdown
}

fn percentage(amount: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        amount / total * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonlens_extractor::QuantityUnit;

    fn material(name: &str, category: &str, quantity: f64) -> ExtractedMaterial {
        ExtractedMaterial {
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            unit: QuantityUnit::CubicMeters,
        }
    }

    fn matched(product_id: &str, factor: f64) -> Option<MaterialMatch> {
        Some(MaterialMatch {
            product_id: product_id.to_string(),
            product_name: product_id.to_string(),
            category: "Structural".to_string(),
            carbon_factor: factor,
            confidence: 1.0,
            match_type: MatchKind::Exact,
            reasons: vec!["exact name match".to_string()],
        })
    }

    fn rows(entries: &[(&str, f64, f64)]) -> Vec<MaterialAnalysis> {
        // (name, quantity, factor); factor 0 means unmatched
        let materials: Vec<ExtractedMaterial> = entries
            .iter()
            .map(|(name, q, _)| material(name, "Structural", *q))
            .collect();
        let matches: HashMap<String, Option<MaterialMatch>> = entries
            .iter()
            .map(|(name, _, f)| {
                let m = if *f > 0.0 { matched("p", *f) } else { None };
                (name.to_string(), m)
            })
            .collect();
        material_rows(&materials, &matches)
    }

    #[test]
    fn total_is_sum_of_quantity_times_factor() {
        let rows = rows(&[("a", 10.0, 0.13), ("b", 2.0, 1.85), ("c", 7.0, 0.0)]);
        let breakdown = aggregate(&rows);

        let expected = 10.0 * 0.13 + 2.0 * 1.85;
        assert!((breakdown.total_kg - expected).abs() < f64::EPSILON * 8.0);
    }

    #[test]
    fn unmatched_rows_classify_none_with_zero_factor() {
        let rows = rows(&[("a", 10.0, 0.0)]);
        assert_eq!(rows[0].match_type, MatchKind::None);
        assert_eq!(rows[0].carbon_per_unit, 0.0);
        assert_eq!(rows[0].total_carbon, 0.0);
        assert!(rows[0].matched_product_id.is_none());
    }

    #[test]
    fn zero_total_yields_zero_percentages_not_nan() {
        let rows = rows(&[("a", 10.0, 0.0), ("b", 5.0, 0.0)]);
        let breakdown = aggregate(&rows);

        assert_eq!(breakdown.total_kg, 0.0);
        for share in breakdown.by_category.values() {
            assert_eq!(share.percentage, 0.0);
        }
        for contributor in &breakdown.top_contributors {
            assert_eq!(contributor.percentage, 0.0);
        }
    }

    #[test]
    fn top_contributors_capped_and_sorted_descending() {
        let rows = rows(&[
            ("a", 1.0, 1.0),
            ("b", 6.0, 1.0),
            ("c", 3.0, 1.0),
            ("d", 5.0, 1.0),
            ("e", 2.0, 1.0),
            ("f", 4.0, 1.0),
            ("g", 7.0, 1.0),
        ]);
        let breakdown = aggregate(&rows);

        assert_eq!(breakdown.top_contributors.len(), TOP_CONTRIBUTOR_LIMIT);
        let names: Vec<&str> = breakdown
            .top_contributors
            .iter()
            .map(|c| c.material_name.as_str())
            .collect();
        assert_eq!(names, vec!["g", "b", "d", "f", "c"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = rows(&[("first", 2.0, 1.0), ("second", 2.0, 1.0), ("third", 5.0, 1.0)]);
        let breakdown = aggregate(&rows);

        let names: Vec<&str> = breakdown
            .top_contributors
            .iter()
            .map(|c| c.material_name.as_str())
            .collect();
        assert_eq!(names, vec!["third", "first", "second"]);
    }

    #[test]
    fn categories_partition_the_total() {
        let materials = vec![
            material("concrete", "Structural", 10.0),
            material("insulation", "Insulation", 5.0),
        ];
        let matches: HashMap<String, Option<MaterialMatch>> = [
            ("concrete".to_string(), matched("p1", 1.0)),
            ("insulation".to_string(), matched("p2", 2.0)),
        ]
        .into_iter()
        .collect();

        let breakdown = aggregate(&material_rows(&materials, &matches));

        assert_eq!(breakdown.total_kg, 20.0);
        assert_eq!(breakdown.by_category["Structural"].carbon_kg, 10.0);
        assert_eq!(breakdown.by_category["Structural"].percentage, 50.0);
        assert_eq!(breakdown.by_category["Insulation"].percentage, 50.0);
    }
}
