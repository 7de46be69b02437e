use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractorError>;

#[derive(Error, Debug)]
pub enum ExtractorError {
    /// An externally supplied identifier failed the allow-list. Raised
    /// before any network use of the identifier.
    #[error("Invalid identifier in field '{field}'")]
    InvalidIdentifier { field: &'static str },

    #[error("Failed to get model manifest: {status}")]
    ManifestUnavailable { status: u16 },

    #[error("Failed to get model properties: {status}")]
    PropertiesUnavailable { status: u16 },

    #[error("No 3D viewable found in model")]
    NoViewableFound,

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}
