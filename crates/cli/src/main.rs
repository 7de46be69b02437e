//! Carbonlens CLI
//!
//! Submits a BIM model for embodied-carbon analysis and prints the
//! terminal job document as JSON.
//!
//! ## Usage
//!
//! ```text
//! carbonlens analyze --urn <model-urn> --token <bearer-token>
//! carbonlens analyze --urn demoUrn123 --demo
//! carbonlens status --urn <model-urn> --token <bearer-token>
//! ```

use anyhow::{bail, Context, Result};
use carbonlens_analysis::{AnalysisOrchestrator, InMemoryJobStore, StaticTokenProvider};
use carbonlens_catalog::{CatalogStore, InMemoryCatalog, Product};
use carbonlens_extractor::{
    DerivativeClient, ModelDerivativeApi, TranslationStatus, DEFAULT_BASE_URL,
};
use carbonlens_protocol::{AnalysisRequest, AnalysisStatus};
use clap::{Parser, Subcommand};
use std::sync::Arc;

mod demo;

use demo::{demo_catalog, DemoDerivative};

#[derive(Parser)]
#[command(name = "carbonlens", about = "Embodied-carbon BIM analysis", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a model and print the completed job document
    Analyze {
        /// Model URN (URL-safe opaque token)
        #[arg(long)]
        urn: String,

        /// Display name stored on the job
        #[arg(long)]
        name: Option<String>,

        /// Bearer token for the model-derivative service
        #[arg(long)]
        token: Option<String>,

        /// Base URL of the model-derivative service
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Path to a product catalog JSON file (array of products)
        #[arg(long)]
        catalog: Option<std::path::PathBuf>,

        /// Run against the built-in demo model and catalog, offline
        #[arg(long)]
        demo: bool,
    },

    /// Print the translation status of a model
    Status {
        #[arg(long)]
        urn: String,

        #[arg(long)]
        token: Option<String>,

        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Query the built-in demo model instead of the live service
        #[arg(long)]
        demo: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match Cli::parse().command {
        Command::Analyze {
            urn,
            name,
            token,
            base_url,
            catalog,
            demo,
        } => analyze(urn, name, token, base_url, catalog, demo).await,
        Command::Status {
            urn,
            token,
            base_url,
            demo,
        } => status(urn, token, base_url, demo).await,
    }
}

async fn analyze(
    urn: String,
    name: Option<String>,
    token: Option<String>,
    base_url: String,
    catalog_path: Option<std::path::PathBuf>,
    demo: bool,
) -> Result<()> {
    let derivative: Arc<dyn ModelDerivativeApi> = if demo {
        Arc::new(DemoDerivative)
    } else {
        Arc::new(DerivativeClient::with_base_url(&base_url).context("invalid base URL")?)
    };

    let catalog: Arc<dyn CatalogStore> = match catalog_path {
        Some(path) => Arc::new(load_catalog(&path)?),
        None => Arc::new(demo_catalog()),
    };

    let token = resolve_token(token, demo)?;
    let orchestrator = AnalysisOrchestrator::new(
        derivative,
        catalog,
        Arc::new(InMemoryJobStore::new()),
        Arc::new(StaticTokenProvider::new(token)),
    );

    let request = AnalysisRequest {
        model_identifier: urn,
        model_name: name,
    };
    let ack = orchestrator.submit("cli", &request).await;
    if ack.status == AnalysisStatus::Failed {
        bail!(
            "submission rejected: {}",
            ack.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    log::info!("Analysis {} processing", ack.analysis_id);
    orchestrator.wait(&ack.analysis_id).await;

    let job = orchestrator.result(&ack.analysis_id).await?;
    println!("{}", serde_json::to_string_pretty(&job)?);

    if job.status == AnalysisStatus::Failed {
        bail!(
            "analysis failed: {}",
            job.error_message.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}

async fn status(urn: String, token: Option<String>, base_url: String, demo: bool) -> Result<()> {
    let client: Arc<dyn ModelDerivativeApi> = if demo {
        Arc::new(DemoDerivative)
    } else {
        Arc::new(DerivativeClient::with_base_url(&base_url).context("invalid base URL")?)
    };
    let token = resolve_token(token, demo)?;

    let TranslationStatus { status, progress } = client.translation_status(&token, &urn).await?;
    println!("{}", serde_json::json!({ "status": status, "progress": progress }));
    Ok(())
}

fn resolve_token(token: Option<String>, demo: bool) -> Result<String> {
    if let Some(token) = token {
        return Ok(token);
    }
    if let Ok(token) = std::env::var("CARBONLENS_TOKEN") {
        return Ok(token);
    }
    if demo {
        return Ok("demo-token".to_string());
    }
    bail!("no access token: pass --token or set CARBONLENS_TOKEN")
}

fn load_catalog(path: &std::path::Path) -> Result<InMemoryCatalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog file {}", path.display()))?;
    let products: Vec<Product> =
        serde_json::from_str(&raw).context("catalog file must be a JSON array of products")?;
    log::info!("Loaded {} catalog products from {}", products.len(), path.display());
    Ok(InMemoryCatalog::new(products))
}
