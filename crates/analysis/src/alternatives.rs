//! Lower-carbon substitute recommendation for the top contributors.

use carbonlens_catalog::CatalogStore;
use carbonlens_protocol::{CarbonAlternative, MaterialAnalysis, TopContributor};

/// Substitute candidates considered per contributor.
pub const ALTERNATIVE_LIMIT: usize = 3;

/// For each top contributor, find same-category products with a strictly
/// lower per-unit factor and compute the reduction against the original
/// amount. No qualifying candidate is a normal empty result; a catalog
/// failure for one contributor is logged and skipped.
pub async fn recommend(
    catalog: &dyn CatalogStore,
    rows: &[MaterialAnalysis],
    top_contributors: &[TopContributor],
) -> Vec<CarbonAlternative> {
    let mut alternatives = Vec::new();

    for contributor in top_contributors {
        let Some(row) = rows.iter().find(|r| r.name == contributor.material_name) else {
            continue;
        };
        if row.carbon_per_unit <= 0.0 || row.total_carbon <= 0.0 {
            // Unmatched contributors have no factor to improve on.
            continue;
        }

        let candidates = match catalog
            .lower_carbon_alternatives(&row.category, row.carbon_per_unit, ALTERNATIVE_LIMIT)
            .await
        {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!(
                    "Alternative lookup failed for '{}': {err}",
                    row.name
                );
                continue;
            }
        };

        for product in candidates {
            let alternative_carbon_kg = product.carbon_factor * row.quantity;
            let carbon_reduction_kg = row.total_carbon - alternative_carbon_kg;
            alternatives.push(CarbonAlternative {
                original_material: row.name.clone(),
                original_carbon_kg: row.total_carbon,
                alternative_name: product.name,
                alternative_carbon_kg,
                carbon_reduction_kg,
                carbon_reduction_percent: carbon_reduction_kg / row.total_carbon * 100.0,
                product_id: product.id,
            });
        }
    }

    alternatives
}
