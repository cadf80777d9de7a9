//! # sns-briefing Binary
//!
//! Renders the briefing feed into static HTML pages. The store backend is
//! chosen from the compiled-in plugins: Firestore by default, or a local
//! JSON snapshot with `--snapshot`. Paginated feeds are written as numbered
//! page series (`posts.html`, `posts-2.html`, ...).

mod site;

use clap::Parser;
use sb_config::{AppConfig, ConfigError};
use sb_core::traits::DocumentStore;
use sb_query::FeedQueries;
use site::SiteGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "store-firestore")]
use sb_store_firestore::FirestoreStore;

#[cfg(feature = "store-memory")]
use anyhow::Context;
#[cfg(feature = "store-memory")]
use sb_store_memory::MemoryDocumentStore;

/// Static site generator for the SNS briefing feed.
#[derive(Parser, Debug)]
#[command(name = "sns-briefing")]
#[command(about = "Render the SNS briefing feed into static HTML", long_about = None)]
struct Args {
    /// Output directory (overrides `site.output_dir`).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Extra configuration file layered over `config/default.toml`.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Read documents from an exported JSON snapshot instead of Firestore.
    #[cfg(feature = "store-memory")]
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Also write `search.html` with the posts matching this text.
    #[arg(long, short)]
    search: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("SB_LOG_JSON").is_ok_and(|v| v == "1");
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(feature = "store-memory")]
fn snapshot_store(args: &Args) -> anyhow::Result<Option<Arc<dyn DocumentStore>>> {
    let Some(path) = &args.snapshot else {
        return Ok(None);
    };
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open snapshot {}", path.display()))?;
    let store = MemoryDocumentStore::from_snapshot(std::io::BufReader::new(file))
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "using snapshot store");
    Ok(Some(Arc::new(store)))
}

#[cfg(not(feature = "store-memory"))]
fn snapshot_store(_args: &Args) -> anyhow::Result<Option<Arc<dyn DocumentStore>>> {
    Ok(None)
}

#[cfg(feature = "store-memory")]
fn wants_snapshot(args: &Args) -> bool {
    args.snapshot.is_some()
}

#[cfg(not(feature = "store-memory"))]
fn wants_snapshot(_args: &Args) -> bool {
    false
}

/// Firestore needs the full Firebase section; a snapshot only the site.
fn load_config(args: &Args) -> Result<AppConfig, ConfigError> {
    if wants_snapshot(args) {
        AppConfig::load_unchecked(args.config.as_deref())
    } else {
        AppConfig::load(args.config.as_deref())
    }
}

#[cfg(feature = "store-firestore")]
fn firestore_store(config: &mut AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store = FirestoreStore::new(std::mem::take(&mut config.firebase))?;
    tracing::info!(project_id = store.project_id(), "using Firestore store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "store-firestore"))]
fn firestore_store(_config: &mut AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    anyhow::bail!("built without store-firestore; pass --snapshot")
}

fn build_store(args: &Args, config: &mut AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match snapshot_store(args)? {
        Some(store) => Ok(store),
        None => firestore_store(config),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut config = load_config(&args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.site.output_dir.clone());

    let store = build_store(&args, &mut config)?;
    let generator =
        SiteGenerator::new(FeedQueries::new(store), config.site.clone()).with_search(args.search.clone());

    let written = generator.write_to(&output).await?;
    tracing::info!(pages = written.len(), output = %output.display(), "site generated");
    Ok(())
}
