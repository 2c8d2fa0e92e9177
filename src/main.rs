use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use taskd::auth::tokens::{self, TokenSigner};
use taskd::config::ServerConfig;
use taskd::rest;
use taskd::storage::Storage;
use taskd::AppContext;

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "taskd — task manager backend with per-user task isolation",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST server port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the server (default when no subcommand given).
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Arc::new(ServerConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
    ));
    init_tracing(&config.log, &config.log_format);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: Arc<ServerConfig>) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "starting taskd"
    );

    let storage = Arc::new(Storage::new(&config.data_dir).await?);
    let secret = tokens::get_or_create_secret(&storage, config.token_secret.as_deref()).await?;
    let signer = Arc::new(TokenSigner::new(&secret, config.token_ttl_days));
    let ctx = Arc::new(AppContext::new(config, storage, signer));

    rest::start_rest_server(ctx).await
}

fn init_tracing(log_level: &str, log_format: &str) {
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .init();
    }
}
