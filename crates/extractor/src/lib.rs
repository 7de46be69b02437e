//! # Carbonlens Extractor
//!
//! Resolves a BIM model identifier to a deduplicated list of materials
//! with quantities, by way of the external model-derivative service.
//!
//! ## Flow
//!
//! ```text
//! model urn ──validate──> manifest ──first 3d viewable──> property tree
//!                                                              │
//!                                          fold by (name, category)
//!                                                              │
//!                                                  ExtractedMaterial[]
//! ```
//!
//! Identifiers are allow-list validated before any network use; see
//! [`validate_model_urn`] for the threat model.

mod cancel;
mod client;
mod error;
mod extract;
mod validate;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use client::{
    Derivative, DerivativeChild, DerivativeClient, Manifest, ModelDerivativeApi,
    PropertyCollection, PropertyData, PropertyObject, TranslationStatus, DEFAULT_BASE_URL,
    SUPPORTED_OUTPUT_TYPES,
};
pub use error::{ExtractorError, Result};
pub use extract::{
    fold_properties, ExtractedMaterial, ModelExtractor, QuantityUnit, AREA_ALIASES,
    CATEGORY_ALIASES, DEFAULT_CATEGORY, DEFAULT_MATERIAL_NAME, MATERIAL_NAME_ALIASES,
    VOLUME_ALIASES,
};
pub use validate::{designdata_url, validate_model_urn, validate_viewable_guid};
