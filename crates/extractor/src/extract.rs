//! Folding a model's property tree into a deduplicated material list.

use crate::cancel::CancelToken;
use crate::client::{ModelDerivativeApi, PropertyObject};
use crate::error::{ExtractorError, Result};
use crate::validate::{validate_model_urn, validate_viewable_guid};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Ordered property-name aliases. The external tree uses inconsistent
/// key casing across authoring tools; the first present, non-empty value
/// wins.
pub const MATERIAL_NAME_ALIASES: [&str; 3] = ["Material", "Material Name", "material"];
pub const CATEGORY_ALIASES: [&str; 2] = ["Category", "category"];
pub const VOLUME_ALIASES: [&str; 2] = ["Volume", "volume"];
pub const AREA_ALIASES: [&str; 2] = ["Area", "area"];

pub const DEFAULT_MATERIAL_NAME: &str = "Unknown Material";
pub const DEFAULT_CATEGORY: &str = "General";

/// Measurement backing a material quantity, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuantityUnit {
    #[serde(rename = "m³")]
    CubicMeters,
    #[serde(rename = "m²")]
    SquareMeters,
    #[serde(rename = "unit")]
    Count,
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuantityUnit::CubicMeters => "m³",
            QuantityUnit::SquareMeters => "m²",
            QuantityUnit::Count => "unit",
        };
        f.write_str(label)
    }
}

/// One material accumulated over all objects that reference it.
///
/// The dedup key is the verbatim (name, category) pair; two names that
/// differ only in case stay separate entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMaterial {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: QuantityUnit,
}

/// First present, non-empty string among the aliases.
fn string_property<'a>(
    properties: &'a serde_json::Map<String, serde_json::Value>,
    aliases: &[&str],
) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|key| properties.get(*key))
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First parseable numeric among the aliases. Values may be JSON numbers
/// or strings with a trailing unit ("12.5 m³"); the leading float is
/// taken, mirroring how the source data is written.
fn numeric_property(
    properties: &serde_json::Map<String, serde_json::Value>,
    aliases: &[&str],
) -> Option<f64> {
    aliases
        .iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => parse_leading_float(s),
            _ => None,
        })
}

fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .take_while(|(i, c)| {
            c.is_ascii_digit()
                || *c == '.'
                || *c == '-'
                || *c == '+'
                || (*c == 'e' && *i > 0)
                || (*c == 'E' && *i > 0)
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    s[..end].parse().ok()
}

/// Fold property objects into materials, summing quantities per
/// (name, category) key. Quantity preference: volume, else area, else a
/// nominal count of 1 so quantity-less objects still surface in the
/// material list instead of vanishing.
pub fn fold_properties(objects: &[PropertyObject]) -> Vec<ExtractedMaterial> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut acc: HashMap<(String, String), ExtractedMaterial> = HashMap::new();

    for object in objects {
        let name = string_property(&object.properties, &MATERIAL_NAME_ALIASES)
            .unwrap_or(DEFAULT_MATERIAL_NAME)
            .to_string();
        let category = string_property(&object.properties, &CATEGORY_ALIASES)
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        let volume = numeric_property(&object.properties, &VOLUME_ALIASES).filter(|v| *v > 0.0);
        let area = numeric_property(&object.properties, &AREA_ALIASES).filter(|a| *a > 0.0);

        let (quantity, unit) = match (volume, area) {
            (Some(v), _) => (v, QuantityUnit::CubicMeters),
            (None, Some(a)) => (a, QuantityUnit::SquareMeters),
            (None, None) => (1.0, QuantityUnit::Count),
        };

        let key = (name.clone(), category.clone());
        match acc.get_mut(&key) {
            Some(existing) => {
                // First-seen unit wins for the key.
                existing.quantity += quantity;
            }
            None => {
                order.push(key.clone());
                acc.insert(
                    key,
                    ExtractedMaterial {
                        name,
                        category,
                        quantity,
                        unit,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| acc.remove(&key))
        .collect()
}

/// Resolves a validated model URN to its material list through the
/// derivative service: manifest, then the full property tree of the
/// first 3-D viewable.
pub struct ModelExtractor {
    api: Arc<dyn ModelDerivativeApi>,
}

impl ModelExtractor {
    pub fn new(api: Arc<dyn ModelDerivativeApi>) -> Self {
        Self { api }
    }

    pub async fn extract(
        &self,
        token: &str,
        model_urn: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<ExtractedMaterial>> {
        validate_model_urn(model_urn)?;

        let manifest = tokio::select! {
            _ = cancel.cancelled() => return Err(ExtractorError::Cancelled),
            manifest = self.api.fetch_manifest(token, model_urn) => manifest?,
        };

        let guid = manifest
            .viewable_guid()
            .ok_or(ExtractorError::NoViewableFound)?;
        let viewable = validate_viewable_guid(guid)?;

        let properties = tokio::select! {
            _ = cancel.cancelled() => return Err(ExtractorError::Cancelled),
            properties = self.api.fetch_properties(token, model_urn, &viewable) => properties?,
        };

        let materials = fold_properties(&properties.data.collection);
        log::info!(
            "Extracted {} materials from {} objects in model {model_urn}",
            materials.len(),
            properties.data.collection.len()
        );

        Ok(materials)
    }
}
