use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bnt_analyzer::{CompletionModel, OpenAiClient};
use bnt_core::{load_app_config, load_brands, load_sources, AppConfig};
use bnt_pipeline::Pipeline;
use bnt_store::{FileStore, RunStore, SeenIndex};

#[derive(Debug, Parser)]
#[command(name = "bnt")]
#[command(about = "Brand news tracker: fetch, scrape, analyze, commit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute one ingestion run over the configured brands and sources.
    Run {
        /// Restrict the run to these brand slugs (repeatable).
        #[arg(long = "brand")]
        brands: Vec<String>,
        /// Re-process articles already in the dedup index.
        #[arg(long)]
        force_refresh: bool,
    },
    /// List stored runs, most recent first.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print one stored run as JSON.
    Show { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            brands,
            force_refresh,
        } => run_pipeline(&config, &brands, force_refresh).await,
        Commands::Runs { limit } => list_runs(&config, limit),
        Commands::Show { id } => show_run(&config, id),
    }
}

async fn run_pipeline(
    config: &AppConfig,
    brand_filter: &[String],
    force_refresh: bool,
) -> anyhow::Result<()> {
    let brands = load_brands(&config.brands_path)
        .with_context(|| format!("loading {}", config.brands_path.display()))?
        .brands;
    let sources = load_sources(&config.sources_path)
        .with_context(|| format!("loading {}", config.sources_path.display()))?
        .sources;

    let store = FileStore::open(&config.data_dir).context("opening run store")?;
    let seen_path = store.seen_path();
    let seen = SeenIndex::load(&seen_path).context("loading dedup index")?;
    let store: Arc<dyn RunStore> = Arc::new(store);

    let model: Arc<dyn CompletionModel> = Arc::new(
        OpenAiClient::new(
            &config.model_base_url,
            config.model_api_key.as_deref(),
            &config.model,
            config.request_timeout_secs,
            &config.user_agent,
        )
        .context("building model client")?,
    );

    let pipeline = Pipeline::new(config.clone(), brands, sources, store, model)
        .context("building pipeline")?
        .with_seen(seen, Some(seen_path));

    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("cancel requested; finishing in-flight work");
            cancel.cancel();
        }
    });

    let run = pipeline.run(brand_filter, force_refresh).await?;
    println!(
        "run {} {:?}: {} articles (fetched {}, deduped out {}, source failures {})",
        run.id,
        run.status,
        run.articles.len(),
        run.counters.fetched,
        run.counters.deduped_out,
        run.counters.source_failures,
    );
    for article in &run.articles {
        println!(
            "  [{}] {} {:+.2}  {}",
            article.scraped.candidate.brand_slug,
            article.sentiment,
            article.polarity,
            article.scraped.candidate.title,
        );
    }
    Ok(())
}

fn list_runs(config: &AppConfig, limit: usize) -> anyhow::Result<()> {
    let store = FileStore::open(&config.data_dir).context("opening run store")?;
    let summaries = store.list_runs()?;
    if summaries.is_empty() {
        println!("no runs stored under {}", config.data_dir.display());
        return Ok(());
    }
    for summary in summaries.into_iter().take(limit) {
        println!(
            "{}  {}  {:?}  {} articles  (fetched {}, deduped out {})",
            summary.id,
            summary.started_at.format("%Y-%m-%d %H:%M:%S"),
            summary.status,
            summary.article_count,
            summary.counters.fetched,
            summary.counters.deduped_out,
        );
    }
    Ok(())
}

fn show_run(config: &AppConfig, id: Uuid) -> anyhow::Result<()> {
    let store = FileStore::open(&config.data_dir).context("opening run store")?;
    let run = store.get_run(id)?;
    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}
