//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start the log writer before accepting traffic
//! - Bind the listener and serve until shutdown
//! - Drain the log writer after the server stops
//!
//! # Design Decisions
//! - Fail fast: route compilation and bind errors are fatal
//! - An unavailable log file is not fatal; the writer retries per record
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::routing::RouteError;
use crate::sink::LogSink;

/// Fatal startup or serving failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service until `shutdown` fires, then drain the log.
pub async fn run(config: ServiceConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (sink, writer) = LogSink::spawn(&config.sink);
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, sink)?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let served = server.run(listener, shutdown.subscribe()).await;

    let stats = writer.finish().await;
    tracing::info!(
        written = stats.written,
        failed = stats.failed,
        "Log sink closed"
    );

    served.map_err(StartupError::Serve)
}
