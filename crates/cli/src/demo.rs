//! Offline demo collaborators: a canned model and a small catalog, so
//! the full pipeline can run without credentials or network access.

use async_trait::async_trait;
use carbonlens_catalog::{InMemoryCatalog, Product};
use carbonlens_extractor::{
    Manifest, ModelDerivativeApi, PropertyCollection, Result as ExtractorResult,
};
use uuid::Uuid;

const DEMO_VIEWABLE: &str = "0d9f6e3a-4b21-48a7-9c52-7f0b8d1e6c5f";

/// Serves a fixed manifest and property tree for any validated URN.
pub struct DemoDerivative;

#[async_trait]
impl ModelDerivativeApi for DemoDerivative {
    async fn fetch_manifest(&self, _token: &str, _urn: &str) -> ExtractorResult<Manifest> {
        Ok(serde_json::from_value(serde_json::json!({
            "urn": "demo",
            "status": "success",
            "progress": "complete",
            "derivatives": [{
                "name": "demo.svf2",
                "outputType": "svf2",
                "status": "success",
                "children": [{"guid": DEMO_VIEWABLE, "type": "geometry", "role": "3d", "name": "3D View"}]
            }]
        }))
        .expect("demo manifest"))
    }

    async fn fetch_properties(
        &self,
        _token: &str,
        _urn: &str,
        _viewable: &Uuid,
    ) -> ExtractorResult<PropertyCollection> {
        Ok(serde_json::from_value(serde_json::json!({
            "data": {
                "type": "properties",
                "collection": [
                    {"objectid": 1, "name": "Slab", "properties":
                        {"Material": "Concrete", "Category": "Structural", "Volume": 42.0}},
                    {"objectid": 2, "name": "Column", "properties":
                        {"Material": "Concrete", "Category": "Structural", "Volume": 8.5}},
                    {"objectid": 3, "name": "Beam", "properties":
                        {"Material": "Steel Beam", "Category": "Structural", "Volume": 1.6}},
                    {"objectid": 4, "name": "Facade Panel", "properties":
                        {"Material": "Glass Panel", "Category": "Facade", "Area": 120.0}},
                    {"objectid": 5, "name": "Wall Insulation", "properties":
                        {"Material": "Mineral Wool", "Category": "Insulation", "Area": 95.0}},
                    {"objectid": 6, "name": "Door Handle", "properties":
                        {"Material": "Door Hardware", "Category": "Fittings"}}
                ]
            }
        }))
        .expect("demo properties"))
    }
}

pub fn demo_catalog() -> InMemoryCatalog {
    let product = |id: &str, name: &str, category: &str, description: &str, factor: f64| Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        carbon_factor: factor,
        declared_unit: "m³".to_string(),
    };

    InMemoryCatalog::new(vec![
        product(
            "gc-concrete-c30",
            "Concrete",
            "Structural",
            "Ready-mix C30/37 structural concrete",
            0.13,
        ),
        product(
            "gc-concrete-ggbs",
            "GGBS Concrete Mix",
            "Structural",
            "50% slag replacement structural mix",
            0.08,
        ),
        product(
            "gc-steel-beam",
            "Steel Beam",
            "Structural",
            "Hot-rolled structural section",
            1.85,
        ),
        product(
            "gc-steel-recycled",
            "Recycled Steel Section",
            "Structural",
            "EAF section, high recycled content",
            0.9,
        ),
        product(
            "gc-glass-panel",
            "Glass Panel",
            "Facade",
            "Double-glazed curtain wall unit",
            2.4,
        ),
        product(
            "gc-mineral-wool",
            "Mineral Wool",
            "Insulation",
            "Stone wool batts",
            1.2,
        ),
        product(
            "gc-wood-fibre",
            "Wood Fibre Insulation",
            "Insulation",
            "Bio-based insulation boards",
            0.4,
        ),
    ])
}
