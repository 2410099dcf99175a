//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and notification handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Serve on a bound listener until the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::capture::{BodyParser, Timestamper};
use crate::config::{MalformedPolicy, ServiceConfig};
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::ShutdownSignal;
use crate::routing::{RouteError, RouteTable};
use crate::sink::LogSink;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub parser: BodyParser,
    pub policy: MalformedPolicy,
    pub sink: LogSink,
    pub stamps: Arc<Timestamper>,
    pub max_body_size: usize,
}

/// HTTP server for the notification recorder.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server that submits records to `sink`.
    pub fn new(config: ServiceConfig, sink: LogSink) -> Result<Self, RouteError> {
        let routes = Arc::new(RouteTable::from_config(&config.routes)?);

        let state = AppState {
            routes,
            parser: BodyParser::new(config.parser.strict),
            policy: config.parser.on_malformed,
            sink,
            stamps: Arc::new(Timestamper::new()),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .fallback(handlers::notification)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer());

        if config.cors.enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
