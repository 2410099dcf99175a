//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tokio::net::TcpListener;
use uuid::Uuid;
use webhook_recorder::config::ServiceConfig;
use webhook_recorder::sink::{SinkWriter, WriterStats};
use webhook_recorder::{HttpServer, LogSink, Shutdown};

/// A recorder running on an ephemeral port with its own log file.
pub struct TestServer {
    pub addr: SocketAddr,
    pub log_path: PathBuf,
    pub client: reqwest::Client,
    shutdown: Shutdown,
    server: tokio::task::JoinHandle<()>,
    writer: SinkWriter,
}

impl TestServer {
    /// Start with default configuration and a fresh temp log file.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start after letting the caller adjust the configuration.
    pub async fn start_with(configure: impl FnOnce(&mut ServiceConfig)) -> Self {
        let log_path = std::env::temp_dir().join(format!("webhook-recorder-it-{}.log", Uuid::new_v4()));

        let mut config = ServiceConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.sink.path = log_path.to_string_lossy().into_owned();
        configure(&mut config);
        let log_path = PathBuf::from(&config.sink.path);

        let (sink, writer) = LogSink::spawn(&config.sink);
        let server = HttpServer::new(config, sink).expect("valid routes");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        let server = tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        Self {
            addr,
            log_path,
            client,
            shutdown,
            server,
            writer,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a raw body with a JSON content type.
    pub async fn post(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("server unreachable")
    }

    /// Poll the log file until it holds `count` records, then parse them.
    pub async fn wait_for_records(&self, count: usize) -> Vec<serde_json::Value> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let contents = tokio::fs::read_to_string(&self.log_path).await.unwrap_or_default();
            let lines: Vec<&str> = contents.lines().collect();
            if lines.len() >= count {
                return lines
                    .iter()
                    .map(|l| serde_json::from_str(l).expect("every line is one JSON record"))
                    .collect();
            }
            if tokio::time::Instant::now() > deadline {
                panic!("expected {count} records, found {}", lines.len());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Stop the server, drain the writer and remove the log file.
    pub async fn stop(self) -> WriterStats {
        self.shutdown.trigger();
        let _ = self.server.await;
        let stats = self.writer.finish().await;
        let _ = tokio::fs::remove_file(&self.log_path).await;
        stats
    }
}
