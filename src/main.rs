mod config;
mod persist;
mod routes;
mod server;
mod store;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use config::{Config, LogConfig};
use persist::JsonFile;
use server::Server;
use store::AnswerStore;

/// File-backed question/answer HTTP service
#[derive(Debug, Parser)]
#[command(name = "replybot", version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    init_logging(&config.log)?;

    info!("Starting replybot - question/answer store");
    info!("Data file: {}", config.data_file);

    // Load the store once at startup; a missing or corrupt data file
    // starts it empty instead of aborting
    let store = AnswerStore::open(Box::new(JsonFile::new(&config.data_file)));

    let server = Server::bind(&config.server_addr, store).await?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await
}

/// Initialize logging, to stdout or to the configured log file
fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match &log.file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to open log file '{}'", path))?;
            builder
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => builder.init(),
    }
    Ok(())
}
