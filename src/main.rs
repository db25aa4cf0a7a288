use anyhow::Result;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use sakani_watch::config::Config;
use sakani_watch::notify::telegram::TelegramChannel;
use sakani_watch::source::sakani::SakaniSource;
use sakani_watch::{JsonStateStore, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sakani_watch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(Path::new(&config_path))?;

    // Saved token from .env (real env vars take precedence)
    Config::load_env_file();
    let token = Config::bot_token()?;

    let source = SakaniSource::new(&config.source);
    let channel = TelegramChannel::new(&config.telegram, token);
    let store = JsonStateStore::new(&config.state.path);

    let pipeline = Pipeline::new(
        &source,
        &channel,
        &store,
        &config.telegram.chat_ids,
        config.pipeline.clone(),
    );

    let summary = pipeline.run().await?;
    if !summary.status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
