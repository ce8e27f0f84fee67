use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use tubeharvest::aggregator::Aggregator;
use tubeharvest::api::{AppState, create_router};
use tubeharvest::config::Config;
use tubeharvest::youtube::YouTubeClient;

#[derive(Debug, Parser)]
#[command(about = "Aggregating video search backend")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Directory with the frontend assets (overrides STATIC_DIR)
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    let client = YouTubeClient::new(&config).context("Failed to build upstream HTTP client")?;
    let state = AppState {
        aggregator: Arc::new(Aggregator::new(Arc::new(client))),
        default_max_results: config.default_max_results,
        max_aggregate_results: config.max_aggregate_results,
    };
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, static_dir = %config.static_dir, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
