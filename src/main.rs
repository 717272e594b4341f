use chalupy_scout::{ChalupyScraper, RpcServer, ScoutConfig};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("🏠 Chalupy Scout - e-chalupy.cz tool server");

    let config = ScoutConfig::load()?;
    info!(
        base_url = %config.base_url,
        timeout_secs = config.request_timeout_secs,
        max_retries = config.max_retries,
        "Configuration loaded"
    );

    let scraper = ChalupyScraper::new(&config)?;
    let server = RpcServer::new(Arc::new(scraper));

    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    Ok(())
}
