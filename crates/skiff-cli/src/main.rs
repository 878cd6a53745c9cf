//! Skiff - Declarative Cloud Run Deployments
//!
//! Usage:
//!   skiff --project my-project --repository apps          # reconcile apps.yaml
//!   skiff --file-path staging.yaml --keep-going           # continue past failures
//!   skiff --debug                                         # dump resolved config

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skiff_core::config;
use skiff_core::context::DeployContext;
use skiff_core::deploy::{ReconcileOutcome, Reconciler};
use skiff_core::platform::{AccessToken, HttpRegistryClient, HttpRunClient, verify_repository};

#[derive(Parser)]
#[command(name = "skiff", version)]
#[command(about = "Reconcile declared applications against Cloud Run", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "apps.yaml")]
    file_path: PathBuf,

    /// GCP project
    #[arg(long, env = "GCP_PROJECT_ID")]
    project: String,

    /// GCP region
    #[arg(long, env = "GCP_REGION", default_value = "europe-west1")]
    region: String,

    /// Artifact Registry repository holding the app images
    #[arg(long, env = "REPO_NAME")]
    repository: String,

    /// Access token for the Google Cloud APIs (falls back to
    /// GOOGLE_ACCESS_TOKEN, then gcloud)
    #[arg(long)]
    token: Option<String>,

    /// Verbose logging, including the resolved app configs
    #[arg(long)]
    debug: bool,

    /// Keep reconciling remaining apps after one fails (default is
    /// fail-fast)
    #[arg(long)]
    keep_going: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.debug {
        "skiff_core=debug,skiff=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::load(&cli.file_path, &cli.project, &cli.region, &cli.repository)?;

    debug!(
        project = %config.project,
        region = %config.region,
        repository = %config.repository,
        "GCP config"
    );
    for app in &config.apps {
        debug!(
            name = %app.name,
            public = app.public,
            image_url = %app.image_url,
            service_id = %app.service_id(),
            "app config"
        );
    }

    let token = AccessToken::resolve(cli.token.as_deref())?;
    let ctx = DeployContext::new(&config.project, &config.region);

    // Fail fast on a misconfigured repository before touching any service.
    let registry = HttpRegistryClient::new(token.as_str())?;
    verify_repository(&registry, &ctx.repository_path(&config.repository)).await?;

    let platform = HttpRunClient::new(token.as_str())?;
    let reconciler = Reconciler::new(ctx, platform);

    let mut failed = 0usize;
    for app in &config.apps {
        match reconciler.reconcile(app).await {
            Ok(outcome) => report(&app.name, &outcome),
            Err(err) if cli.keep_going => {
                error!(app = %app.name, "reconciliation failed: {err:#}");
                failed += 1;
            }
            Err(err) => {
                return Err(err.context(format!("Failed to reconcile app '{}'", app.name)));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} app(s) failed to reconcile");
    }
    Ok(())
}

fn report(name: &str, outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Created { url } => {
            println!("{} deployed to: {url}", style(name).green().bold());
        }
        ReconcileOutcome::Updated { revision } => {
            println!("{} updated, new revision: {revision}", style(name).green().bold());
        }
        ReconcileOutcome::Unchanged { url } => {
            println!("{} up to date: {url}", style(name).dim().bold());
        }
    }
}
