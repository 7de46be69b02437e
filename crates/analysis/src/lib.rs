//! # Carbonlens Analysis
//!
//! The embodied-carbon analysis pipeline: aggregation, substitute
//! recommendation, and the job orchestrator that drives extraction →
//! matching → aggregation → recommendation as one tracked background
//! task per submitted model.
//!
//! Collaborators (derivative API, catalog, job store, token provider)
//! are injected as trait objects so the whole pipeline runs against
//! fakes in tests.

mod aggregate;
mod alternatives;
mod error;
mod orchestrator;
mod store;
mod token;

pub use aggregate::{aggregate, material_rows, TOP_CONTRIBUTOR_LIMIT};
pub use alternatives::{recommend, ALTERNATIVE_LIMIT};
pub use error::{AnalysisError, Result};
pub use orchestrator::AnalysisOrchestrator;
pub use store::{InMemoryJobStore, JobStore};
pub use token::{AccessTokenProvider, StaticTokenProvider};
