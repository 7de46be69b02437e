use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use carbonlens_protocol::AnalysisJob;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence for analysis job documents.
///
/// The orchestrator is the only writer; readers poll by id.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: AnalysisJob) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<AnalysisJob>>;

    async fn update(&self, job: AnalysisJob) -> Result<()>;
}

/// In-memory job store for tests and the demo mode.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, AnalysisJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: AnalysisJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(AnalysisError::JobStore(format!(
                "job '{}' already exists",
                job.id
            )));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<AnalysisJob>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn update(&self, job: AnalysisJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(&job.id) {
            return Err(AnalysisError::JobStore(format!(
                "job '{}' does not exist",
                job.id
            )));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }
}
