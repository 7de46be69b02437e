use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] carbonlens_extractor::ExtractorError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] carbonlens_catalog::CatalogError),

    #[error("Token provider error: {0}")]
    Token(String),

    #[error("Job store error: {0}")]
    JobStore(String),

    #[error("Analysis job not found: {0}")]
    JobNotFound(String),
}
