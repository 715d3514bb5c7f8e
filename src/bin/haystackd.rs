//! haystackd server entry point
//!
//! Loads the configuration snapshot, builds the corpus store, and
//! serves lookups until terminated by Ctrl-C or SIGTERM. SIGHUP
//! reloads the static corpus snapshot without a restart.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use haystack::core::config::Config;
use haystack::core::services::Services;
use haystack::net::Server;

/// haystackd - exact line-match lookup server
#[derive(Parser, Debug)]
#[command(name = "haystackd")]
#[command(version)]
#[command(about = "Exact line-match lookup server", long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "HAYSTACKD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    /// Override the corpus file path
    #[arg(long, value_name = "PATH")]
    txt_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "haystack=info".into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting haystackd");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> haystack::Result<()> {
    // Load configuration
    let mut config = Config::load_from(args.config.as_deref())?;

    // Command-line overrides win over file and environment
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(txt_file) = args.txt_file {
        config.corpus.txt_file = txt_file;
    }
    config.validate()?;

    // Log configuration details
    config.log_config();

    // Build shared services; static mode reads the corpus here
    let services = Services::new(config).await?;

    // Bind and serve until shutdown
    Server::new(services)?.run().await
}
