use crate::error::Result;
use async_trait::async_trait;

/// Supplies a valid bearer token for the model-derivative service.
///
/// Refresh and connection management live outside this subsystem; the
/// pipeline only asks for a usable token per owner.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self, owner_id: &str) -> Result<String>;
}

/// Wraps a fixed token, for the CLI and tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self, _owner_id: &str) -> Result<String> {
        Ok(self.token.clone())
    }
}
