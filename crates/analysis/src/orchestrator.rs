//! Analysis job orchestration.
//!
//! Owns the `processing → completed|failed` lifecycle: creates the job
//! record, spawns one tracked background task per job, and persists the
//! terminal state. Every pipeline error is absorbed here; the caller
//! already got its acknowledgment and polls for the outcome.

use crate::aggregate::{aggregate, material_rows};
use crate::alternatives::recommend;
use crate::error::{AnalysisError, Result};
use crate::store::JobStore;
use crate::token::AccessTokenProvider;
use carbonlens_catalog::CatalogStore;
use carbonlens_extractor::{
    cancel_pair, validate_model_urn, CancelHandle, CancelToken, ModelDerivativeApi, ModelExtractor,
};
use carbonlens_matcher::{BatchMatcher, MatchOptions, MaterialQuery};
use carbonlens_protocol::{
    AnalysisAck, AnalysisData, AnalysisJob, AnalysisRequest, CarbonAlternative, ModelMetadata,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Tracked background task for one job: the join handle is retained so
/// no task failure goes unobserved, and the cancel handle aborts
/// in-flight extractor calls.
struct JobHandle {
    cancel: CancelHandle,
    join: JoinHandle<()>,
}

pub struct AnalysisOrchestrator {
    derivative: Arc<dyn ModelDerivativeApi>,
    catalog: Arc<dyn CatalogStore>,
    jobs: Arc<dyn JobStore>,
    tokens: Arc<dyn AccessTokenProvider>,
    handles: Mutex<HashMap<String, JobHandle>>,
}

impl AnalysisOrchestrator {
    pub fn new(
        derivative: Arc<dyn ModelDerivativeApi>,
        catalog: Arc<dyn CatalogStore>,
        jobs: Arc<dyn JobStore>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            derivative,
            catalog,
            jobs,
            tokens,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Submit a model for analysis.
    ///
    /// Identifier validation happens synchronously, before a job record
    /// exists; everything after the returned acknowledgment runs in the
    /// background and lands on the job record.
    pub async fn submit(&self, owner_id: &str, request: &AnalysisRequest) -> AnalysisAck {
        if let Err(err) = validate_model_urn(&request.model_identifier) {
            return AnalysisAck::failed(err.to_string());
        }

        let job_id = Uuid::new_v4().to_string();
        let job = AnalysisJob::new(
            job_id.as_str(),
            owner_id,
            request.model_identifier.as_str(),
            request.model_name.clone(),
        );
        if let Err(err) = self.jobs.create(job).await {
            log::error!("Failed to create analysis record: {err}");
            return AnalysisAck::failed("Failed to create analysis record");
        }

        let (cancel, token) = cancel_pair();
        let task = PipelineTask {
            derivative: Arc::clone(&self.derivative),
            catalog: Arc::clone(&self.catalog),
            jobs: Arc::clone(&self.jobs),
            tokens: Arc::clone(&self.tokens),
            job_id: job_id.clone(),
            owner_id: owner_id.to_string(),
            model_urn: request.model_identifier.clone(),
            model_name: request.model_name.clone(),
        };
        let join = tokio::spawn(task.run(token));

        self.handles
            .lock()
            .await
            .insert(job_id.clone(), JobHandle { cancel, join });

        AnalysisAck::processing(job_id)
    }

    /// Poll endpoint: the full job record, terminal or not.
    pub async fn result(&self, analysis_id: &str) -> Result<AnalysisJob> {
        self.jobs
            .get(analysis_id)
            .await?
            .ok_or_else(|| AnalysisError::JobNotFound(analysis_id.to_string()))
    }

    /// Request cancellation of a running job. Returns false when the job
    /// is unknown or already finished and reaped.
    pub async fn cancel(&self, analysis_id: &str) -> bool {
        match self.handles.lock().await.get(analysis_id) {
            Some(handle) => {
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Wait for a job's background task to finish and reap its handle.
    pub async fn wait(&self, analysis_id: &str) {
        let handle = self.handles.lock().await.remove(analysis_id);
        if let Some(handle) = handle {
            if let Err(err) = handle.join.await {
                log::error!("Analysis task for '{analysis_id}' aborted: {err}");
            }
        }
    }
}

struct PipelineTask {
    derivative: Arc<dyn ModelDerivativeApi>,
    catalog: Arc<dyn CatalogStore>,
    jobs: Arc<dyn JobStore>,
    tokens: Arc<dyn AccessTokenProvider>,
    job_id: String,
    owner_id: String,
    model_urn: String,
    model_name: Option<String>,
}

impl PipelineTask {
    async fn run(self, cancel: CancelToken) {
        match self.execute(&cancel).await {
            Ok((total_kg, data, alternatives)) => {
                log::info!(
                    "Analysis {} completed: {total_kg:.3} kg CO2e over {} materials",
                    self.job_id,
                    data.materials.len()
                );
                self.persist(|job| job.complete(total_kg, data, alternatives))
                    .await;
            }
            Err(err) => {
                log::warn!("Analysis {} failed: {err}", self.job_id);
                self.persist(|job| job.fail(err.to_string())).await;
            }
        }
    }

    async fn execute(
        &self,
        cancel: &CancelToken,
    ) -> Result<(f64, AnalysisData, Vec<CarbonAlternative>)> {
        let token = self.tokens.access_token(&self.owner_id).await?;

        let extractor = ModelExtractor::new(Arc::clone(&self.derivative));
        let materials = extractor.extract(&token, &self.model_urn, cancel).await?;

        let queries: Vec<MaterialQuery> = materials
            .iter()
            .map(|m| MaterialQuery::new(m.name.as_str(), m.category.as_str()))
            .collect();
        let matches = BatchMatcher::new(Arc::clone(&self.catalog))
            .match_all(&queries, &MatchOptions::default())
            .await;

        let rows = material_rows(&materials, &matches);
        let breakdown = aggregate(&rows);
        let alternatives =
            recommend(self.catalog.as_ref(), &rows, &breakdown.top_contributors).await;

        let matched = rows
            .iter()
            .filter(|r| r.matched_product_id.is_some())
            .count();
        let metadata = ModelMetadata {
            model_urn: self.model_urn.clone(),
            model_name: self.model_name.clone(),
            extracted_materials_count: rows.len(),
            matched_materials_count: matched,
            unmatched_materials_count: rows.len() - matched,
        };

        let total_kg = breakdown.total_kg;
        let data = AnalysisData {
            materials: rows,
            breakdown,
            metadata,
        };
        Ok((total_kg, data, alternatives))
    }

    /// Apply a terminal transition to the stored job. Persistence errors
    /// here have nowhere to go but the log.
    async fn persist(&self, apply: impl FnOnce(&mut AnalysisJob)) {
        match self.jobs.get(&self.job_id).await {
            Ok(Some(mut job)) => {
                apply(&mut job);
                if let Err(err) = self.jobs.update(job).await {
                    log::error!("Failed to persist analysis {}: {err}", self.job_id);
                }
            }
            Ok(None) => {
                log::error!("Analysis record {} vanished mid-pipeline", self.job_id);
            }
            Err(err) => {
                log::error!("Failed to load analysis {}: {err}", self.job_id);
            }
        }
    }
}
