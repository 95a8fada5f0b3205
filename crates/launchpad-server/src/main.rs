use anyhow::{Context, Result};
use launchpad_server::{config::LaunchpadConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = LaunchpadConfig::load().context("Failed to load configuration")?;

    init_tracing(&config).context("Failed to initialize tracing")?;

    launchpad_server::run(config)
        .await
        .context("Launchpad bootstrap failed")?;

    Ok(())
}
