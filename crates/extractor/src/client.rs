//! HTTP client for the model-derivative service, behind a trait so the
//! pipeline can run against fakes in tests.

use crate::error::{ExtractorError, Result};
use crate::validate::designdata_url;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Public endpoint of the model-derivative service.
pub const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com/modelderivative/v2";

/// Derivative output types the extractor can analyze.
pub const SUPPORTED_OUTPUT_TYPES: [&str; 2] = ["svf2", "svf"];

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub urn: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub derivatives: Vec<Derivative>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Derivative {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "outputType", default)]
    pub output_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub children: Vec<DerivativeChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DerivativeChild {
    #[serde(default)]
    pub guid: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
}

impl Manifest {
    /// First derivative in a supported 3-D format that actually carries a
    /// child with role `"3d"`; returns that child's guid.
    pub fn viewable_guid(&self) -> Option<&str> {
        self.derivatives
            .iter()
            .filter(|d| SUPPORTED_OUTPUT_TYPES.contains(&d.output_type.as_str()))
            .find_map(|d| {
                d.children
                    .iter()
                    .find(|c| c.role == "3d")
                    .map(|c| c.guid.as_str())
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyCollection {
    pub data: PropertyData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyData {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub collection: Vec<PropertyObject>,
}

/// One object from the model's property tree. Property values arrive as
/// an open-ended bag keyed by display names.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyObject {
    #[serde(default)]
    pub objectid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "externalId", default)]
    pub external_id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Translation state of a model, from the manifest endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationStatus {
    pub status: String,
    pub progress: String,
}

/// Read access to the model-derivative service.
///
/// Both lookups require a bearer token and a *validated* identifier;
/// implementations must never accept a pre-built URL.
#[async_trait]
pub trait ModelDerivativeApi: Send + Sync {
    async fn fetch_manifest(&self, token: &str, urn: &str) -> Result<Manifest>;

    async fn fetch_properties(
        &self,
        token: &str,
        urn: &str,
        viewable: &Uuid,
    ) -> Result<PropertyCollection>;

    /// Translation status passthrough; the default reads the manifest.
    async fn translation_status(&self, token: &str, urn: &str) -> Result<TranslationStatus> {
        let manifest = self.fetch_manifest(token, urn).await?;
        Ok(TranslationStatus {
            status: manifest.status,
            progress: manifest.progress.unwrap_or_else(|| "0%".to_string()),
        })
    }
}

/// `reqwest`-backed implementation against a configurable base URL.
pub struct DerivativeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DerivativeClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("default base URL is valid")
    }

    pub fn with_base_url(base_url: &str) -> std::result::Result<Self, url::ParseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }
}

impl Default for DerivativeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelDerivativeApi for DerivativeClient {
    async fn fetch_manifest(&self, token: &str, urn: &str) -> Result<Manifest> {
        let url = designdata_url(&self.base_url, urn, &["manifest"])?;
        log::debug!("Fetching manifest for model {urn}");

        let response = self.http.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(ExtractorError::ManifestUnavailable {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn fetch_properties(
        &self,
        token: &str,
        urn: &str,
        viewable: &Uuid,
    ) -> Result<PropertyCollection> {
        let guid = viewable.as_hyphenated().to_string();
        let url = designdata_url(&self.base_url, urn, &["metadata", &guid, "properties"])?;
        log::debug!("Fetching properties for model {urn}, viewable {guid}");

        let response = self.http.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(ExtractorError::PropertiesUnavailable {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_json(derivatives: serde_json::Value) -> Manifest {
        serde_json::from_value(serde_json::json!({
            "urn": "urn123",
            "status": "success",
            "progress": "complete",
            "derivatives": derivatives,
        }))
        .unwrap()
    }

    #[test]
    fn viewable_guid_finds_first_supported_3d_child() {
        let manifest = manifest_json(serde_json::json!([
            {
                "name": "thumbnail",
                "outputType": "thumbnail",
                "children": [{"guid": "aaaaaaaa-0000-0000-0000-000000000000", "role": "2d"}]
            },
            {
                "name": "model.svf2",
                "outputType": "svf2",
                "children": [
                    {"guid": "bbbbbbbb-0000-0000-0000-000000000000", "role": "2d"},
                    {"guid": "cccccccc-0000-0000-0000-000000000000", "role": "3d"}
                ]
            }
        ]));

        assert_eq!(
            manifest.viewable_guid(),
            Some("cccccccc-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn viewable_guid_skips_supported_derivative_without_3d_child() {
        let manifest = manifest_json(serde_json::json!([
            {
                "outputType": "svf2",
                "children": [{"guid": "aaaaaaaa-0000-0000-0000-000000000000", "role": "2d"}]
            },
            {
                "outputType": "svf",
                "children": [{"guid": "dddddddd-0000-0000-0000-000000000000", "role": "3d"}]
            }
        ]));

        assert_eq!(
            manifest.viewable_guid(),
            Some("dddddddd-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn viewable_guid_none_when_no_3d_content() {
        let manifest = manifest_json(serde_json::json!([
            {"outputType": "thumbnail", "children": []},
            {"outputType": "obj", "children": [{"guid": "x", "role": "3d"}]}
        ]));

        assert_eq!(manifest.viewable_guid(), None);
    }

    #[test]
    fn manifest_tolerates_missing_fields() {
        let manifest: Manifest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(manifest.derivatives.is_empty());
        assert_eq!(manifest.viewable_guid(), None);
    }
}
