use bootstrap_log_stream::config::{DEFAULT_LOG_FILE, DEFAULT_PORT};
use bootstrap_log_stream::{ServerConfig, serve};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Streams a bootstrap log file to HTTP clients as Server-Sent Events.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Log file to follow
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let config = ServerConfig {
        log_file: args.log_file,
        port: args.port,
        ..ServerConfig::default()
    };

    if let Err(e) = serve(config).await {
        tracing::error!("Server failed: {e}");
        process::exit(1);
    }
}
