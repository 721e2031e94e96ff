use anyhow::Result;
use portfolio_site::{config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portfolio_site=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting portfolio site");

    // Load configuration from environment
    let config = config::Config::from_env()?;
    info!(
        "Serving locales from {}, static files from {}",
        config.locales_dir.display(),
        config.static_dir.display()
    );

    server::serve(config).await
}
