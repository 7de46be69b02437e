//! Allow-list validation for externally supplied identifiers.
//!
//! Model and viewable identifiers are interpolated into outbound request
//! paths; anything outside the allow-list could redirect the request
//! (path traversal, protocol or host smuggling, query/fragment
//! injection). Validation runs before *any* use of an identifier in a
//! URL, including inside nested helpers.

use crate::error::{ExtractorError, Result};
use url::Url;
use uuid::Uuid;

const MAX_URN_LEN: usize = 1000;

/// Accept a model URN only if it is a safe opaque token: 1–1000 chars of
/// `[A-Za-z0-9_-]`, free of `..`, `//` and `#`.
pub fn validate_model_urn(urn: &str) -> Result<()> {
    if urn.is_empty() || urn.len() > MAX_URN_LEN {
        return Err(ExtractorError::InvalidIdentifier { field: "model_urn" });
    }

    let charset_ok = urn
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !charset_ok {
        return Err(ExtractorError::InvalidIdentifier { field: "model_urn" });
    }

    // The charset above already excludes these; kept as an explicit
    // second gate against traversal patterns.
    if urn.contains("..") || urn.contains("//") || urn.contains('#') {
        return Err(ExtractorError::InvalidIdentifier { field: "model_urn" });
    }

    Ok(())
}

/// Accept a viewable identifier only as a canonical hyphenated UUID.
pub fn validate_viewable_guid(guid: &str) -> Result<Uuid> {
    if guid.len() != 36 {
        return Err(ExtractorError::InvalidIdentifier {
            field: "viewable_guid",
        });
    }
    Uuid::parse_str(guid).map_err(|_| ExtractorError::InvalidIdentifier {
        field: "viewable_guid",
    })
}

/// Build a `designdata` URL for a validated model URN plus path suffix.
///
/// Pure function: validate, then append as percent-encoded path segments
/// onto the fixed base. Callers never supply a pre-built URL.
pub fn designdata_url(base: &Url, urn: &str, suffix: &[&str]) -> Result<Url> {
    validate_model_urn(urn)?;

    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ExtractorError::InvalidIdentifier { field: "base_url" })?;
        segments.pop_if_empty();
        segments.push("designdata");
        segments.push(urn);
        for part in suffix {
            segments.push(part);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://developer.api.autodesk.com/modelderivative/v2").unwrap()
    }

    #[test]
    fn accepts_url_safe_base64_urns() {
        assert!(validate_model_urn("dXJuOmFkc2sud2lwcHJvZDpmcy5maWxlOnZmLkFCQ0RFRkdI").is_ok());
        assert!(validate_model_urn("urn_with-underscores_and-hyphens123").is_ok());
        assert!(validate_model_urn("ABC123xyz456").is_ok());
        assert!(validate_model_urn(&"a".repeat(1000)).is_ok());
    }

    #[test]
    fn rejects_traversal_and_injection_patterns() {
        for bad in [
            "../../etc/passwd",
            "valid-urn//internal-service",
            "valid-urn#malicious-fragment",
            "urn/with/slashes",
            "urn%2F..%2F..%2Fetc%2Fpasswd",
            "urn?query=malicious",
            "urn:internal:service",
            "user@internal-host",
            "urn with spaces",
        ] {
            let err = validate_model_urn(bad).expect_err(bad);
            assert!(
                matches!(err, ExtractorError::InvalidIdentifier { field: "model_urn" }),
                "wrong error for {bad}: {err}"
            );
        }
    }

    #[test]
    fn rejects_empty_and_oversized_urns() {
        assert!(validate_model_urn("").is_err());
        assert!(validate_model_urn(&"a".repeat(1001)).is_err());
    }

    #[test]
    fn guid_must_be_canonical_uuid() {
        assert!(validate_viewable_guid("123e4567-e89b-12d3-a456-426614174000").is_ok());
        assert!(validate_viewable_guid("123E4567-E89B-12D3-A456-426614174000").is_ok());

        for bad in [
            "../../etc/passwd",
            "http://internal-service/api",
            "not-a-valid-uuid",
            "123e4567-e89b-12d3-a456",
            "123e4567e89b12d3a456426614174000", // simple form, not canonical
        ] {
            assert!(validate_viewable_guid(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn builds_manifest_url_onto_fixed_base() {
        let url = designdata_url(&base(), "validBase64Urn123", &["manifest"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://developer.api.autodesk.com/modelderivative/v2/designdata/validBase64Urn123/manifest"
        );
    }

    #[test]
    fn builds_properties_url_with_metadata_segments() {
        let url = designdata_url(
            &base(),
            "validUrn_with-chars",
            &["metadata", "123e4567-e89b-12d3-a456-426614174000", "properties"],
        )
        .unwrap();
        assert!(url.path().contains("/designdata/validUrn_with-chars/metadata/"));
        assert!(url.path().ends_with("/properties"));
    }

    #[test]
    fn url_builder_rejects_malicious_urns() {
        assert!(designdata_url(&base(), "../../../internal-service", &["manifest"]).is_err());
        assert!(designdata_url(&base(), "http://attacker.com/", &["manifest"]).is_err());
    }
}
