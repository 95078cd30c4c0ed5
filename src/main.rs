use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use cue_remote::api;
use cue_remote::paths;
use cue_remote::settings::{self, DeviceConfig};
use cue_remote::state::AppState;

#[derive(Parser)]
#[command(name = "cue-remote", about = "HTTP trigger surface for the playback controller remote")]
struct Args {
    /// Device host, overriding the stored config for this process
    #[arg(long)]
    host: Option<String>,

    /// Directory holding config.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Address to bind the API on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,

    /// Port to bind the API on
    #[arg(long, default_value_t = 8787)]
    port: u16,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

async fn run(args: Args) -> Result<(), String> {
    let config_dir = args.config_dir.unwrap_or_else(paths::default_config_dir);
    let mut config: DeviceConfig = settings::load_config(&config_dir)?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if config.host.trim().is_empty() {
        tracing::warn!("No host configured; commands will fail until one is set via PUT /api/config");
    }

    let state = Arc::new(AppState::with_http(config)?.with_config_dir(config_dir));
    api::start_api_server(state, SocketAddr::new(args.bind, args.port)).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;
    tracing::info!("Shutting down");
    Ok(())
}
