use async_trait::async_trait;
use carbonlens_extractor::{
    cancel_pair, CancelToken, ExtractorError, Manifest, ModelDerivativeApi, ModelExtractor,
    PropertyCollection, QuantityUnit, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

const GUID: &str = "123e4567-e89b-12d3-a456-426614174000";

struct FakeApi {
    manifest: serde_json::Value,
    properties: serde_json::Value,
    manifest_calls: AtomicUsize,
    property_calls: AtomicUsize,
    hang_on_properties: bool,
}

impl FakeApi {
    fn new(manifest: serde_json::Value, properties: serde_json::Value) -> Self {
        Self {
            manifest,
            properties,
            manifest_calls: AtomicUsize::new(0),
            property_calls: AtomicUsize::new(0),
            hang_on_properties: false,
        }
    }

    fn with_3d_viewable(properties: serde_json::Value) -> Self {
        Self::new(
            serde_json::json!({
                "urn": "urn123",
                "status": "success",
                "derivatives": [{
                    "outputType": "svf2",
                    "children": [{"guid": GUID, "role": "3d"}]
                }]
            }),
            properties,
        )
    }
}

#[async_trait]
impl ModelDerivativeApi for FakeApi {
    async fn fetch_manifest(&self, _token: &str, _urn: &str) -> Result<Manifest> {
        self.manifest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(self.manifest.clone()).expect("manifest json"))
    }

    async fn fetch_properties(
        &self,
        _token: &str,
        _urn: &str,
        _viewable: &Uuid,
    ) -> Result<PropertyCollection> {
        self.property_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_properties {
            std::future::pending::<()>().await;
        }
        Ok(serde_json::from_value(self.properties.clone()).expect("properties json"))
    }
}

fn properties(objects: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"data": {"type": "properties", "collection": objects}})
}

#[tokio::test]
async fn extracts_and_accumulates_materials() {
    let api = Arc::new(FakeApi::with_3d_viewable(properties(serde_json::json!([
        {"objectid": 1, "properties": {"Material": "Concrete", "Category": "Structural", "Volume": 10.0}},
        {"objectid": 2, "properties": {"Material": "Concrete", "Category": "Structural", "Volume": 5.0}},
        {"objectid": 3, "properties": {"Material": "Glass", "Category": "Facade", "Area": 30.0}},
    ]))));

    let extractor = ModelExtractor::new(Arc::clone(&api) as Arc<dyn ModelDerivativeApi>);
    let materials = extractor
        .extract("token", "validUrn123", &CancelToken::never())
        .await
        .expect("extraction");

    assert_eq!(materials.len(), 2);
    assert_eq!(materials[0].name, "Concrete");
    assert_eq!(materials[0].quantity, 15.0);
    assert_eq!(materials[0].unit, QuantityUnit::CubicMeters);
    assert_eq!(materials[1].name, "Glass");
    assert_eq!(materials[1].unit, QuantityUnit::SquareMeters);

    assert_eq!(api.manifest_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.property_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fails_before_any_network_call_on_bad_urn() {
    let api = Arc::new(FakeApi::with_3d_viewable(properties(serde_json::json!([]))));
    let extractor = ModelExtractor::new(Arc::clone(&api) as Arc<dyn ModelDerivativeApi>);

    let err = extractor
        .extract("token", "../../etc/passwd", &CancelToken::never())
        .await
        .expect_err("must reject");

    assert!(matches!(
        err,
        ExtractorError::InvalidIdentifier { field: "model_urn" }
    ));
    assert_eq!(api.manifest_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.property_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_viewable_is_a_distinct_error() {
    let api = Arc::new(FakeApi::new(
        serde_json::json!({
            "urn": "urn123",
            "status": "success",
            "derivatives": [{"outputType": "thumbnail", "children": []}]
        }),
        properties(serde_json::json!([])),
    ));
    let extractor = ModelExtractor::new(api as Arc<dyn ModelDerivativeApi>);

    let err = extractor
        .extract("token", "validUrn123", &CancelToken::never())
        .await
        .expect_err("must fail");

    assert!(matches!(err, ExtractorError::NoViewableFound));
    assert!(err.to_string().to_lowercase().contains("viewable"));
}

#[tokio::test]
async fn cancel_aborts_inflight_properties_call() {
    let mut api = FakeApi::with_3d_viewable(properties(serde_json::json!([])));
    api.hang_on_properties = true;
    let extractor = ModelExtractor::new(Arc::new(api) as Arc<dyn ModelDerivativeApi>);

    let (handle, token) = cancel_pair();
    let extraction = tokio::spawn(async move {
        extractor.extract("token", "validUrn123", &token).await
    });

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    handle.cancel();

    let err = extraction.await.expect("join").expect_err("cancelled");
    assert!(matches!(err, ExtractorError::Cancelled));
}
