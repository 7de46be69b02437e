//! Shared job and wire types for the carbon analysis pipeline.
//!
//! Every crate in the workspace exchanges data through these shapes; the
//! field names match the JSON documents stored for a job and returned to
//! polling clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

/// How a material was matched against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Category,
    None,
}

/// Request to analyze one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub model_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// Immediate acknowledgment returned by the submit endpoint.
///
/// A submitter always receives this synchronously; terminal results are
/// obtained by polling with the returned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisAck {
    pub analysis_id: String,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisAck {
    pub fn processing(analysis_id: impl Into<String>) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            status: AnalysisStatus::Processing,
            error: None,
        }
    }

    /// Acknowledgment for a submission that failed before a job record
    /// existed; the id is empty because there is nothing to poll.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            analysis_id: String::new(),
            status: AnalysisStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// One extracted material with its match outcome and carbon contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialAnalysis {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub carbon_per_unit: f64,
    pub total_carbon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_confidence: Option<f64>,
    pub match_type: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub carbon_kg: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopContributor {
    pub material_name: String,
    pub carbon_kg: f64,
    pub percentage: f64,
}

/// Carbon totals broken down by category plus the largest contributors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarbonBreakdown {
    pub total_kg: f64,
    pub by_category: BTreeMap<String, CategoryShare>,
    pub top_contributors: Vec<TopContributor>,
}

/// A lower-carbon substitute for one of the top contributors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonAlternative {
    pub original_material: String,
    pub original_carbon_kg: f64,
    pub alternative_name: String,
    pub alternative_carbon_kg: f64,
    pub carbon_reduction_kg: f64,
    pub carbon_reduction_percent: f64,
    pub product_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub extracted_materials_count: usize,
    pub matched_materials_count: usize,
    pub unmatched_materials_count: usize,
}

/// Full analysis payload persisted on a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisData {
    pub materials: Vec<MaterialAnalysis>,
    pub breakdown: CarbonBreakdown,
    pub metadata: ModelMetadata,
}

/// The analysis job document.
///
/// Created when a caller submits a model; only the orchestrator mutates
/// it, and only through [`AnalysisJob::complete`] / [`AnalysisJob::fail`],
/// which keep the status transition one-way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: String,
    pub owner_id: String,
    pub model_urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbon_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_data: Option<AnalysisData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<CarbonAlternative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisJob {
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        model_urn: impl Into<String>,
        model_name: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            model_urn: model_urn.into(),
            model_name,
            status: AnalysisStatus::Processing,
            total_carbon_kg: None,
            analysis_data: None,
            alternatives: Vec::new(),
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Transition to `Completed` with the final payload. Ignored if the
    /// job already reached a terminal state.
    pub fn complete(
        &mut self,
        total_carbon_kg: f64,
        data: AnalysisData,
        alternatives: Vec<CarbonAlternative>,
    ) {
        if self.status.is_terminal() {
            return;
        }
        self.status = AnalysisStatus::Completed;
        self.total_carbon_kg = Some(total_carbon_kg);
        self.analysis_data = Some(data);
        self.alternatives = alternatives;
        self.completed_at = Some(Utc::now());
    }

    /// Transition to `Failed` with an error message. Ignored if the job
    /// already reached a terminal state.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = AnalysisStatus::Failed;
        self.error_message = Some(error.into());
    }
}
