use std::path::PathBuf;

use clap::Parser;

use webhook_recorder::config::validation::validate_config;
use webhook_recorder::config::{load_or_default, ConfigError};
use webhook_recorder::lifecycle::{signals, startup};
use webhook_recorder::observability::logging;
use webhook_recorder::Shutdown;

#[derive(Parser)]
#[command(name = "webhook-recorder")]
#[command(about = "Records payment notifications to an append-only log", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(long)]
    bind: Option<String>,

    /// Override sink.path
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(path) = cli.log_file {
        config.sink.path = path;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("webhook-recorder v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_file = %config.sink.path,
        on_malformed = config.parser.on_malformed.as_str(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    startup::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
