//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the recorder.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the notification recorder.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Append-only log file settings.
    pub sink: SinkConfig,

    /// Body decoding and malformed-payload policy.
    pub parser: ParserConfig,

    /// Transport-level request limits.
    pub security: SecurityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Notification routes, checked in precedence order.
    pub routes: Vec<RouteConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            sink: SinkConfig::default(),
            parser: ParserConfig::default(),
            security: SecurityConfig::default(),
            timeouts: TimeoutConfig::default(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: default_routes(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Append-only log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Path of the log file, created if absent.
    pub path: String,

    /// Call `sync_data` after every record.
    pub fsync: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: "logs.txt".to_string(),
            fsync: false,
        }
    }
}

/// What happens to a request whose body fails JSON decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Record the request, answer `400 JSON inválido`.
    #[default]
    Reject,
    /// Record the request without a body, answer the usual acknowledgement.
    Accept,
}

impl MalformedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MalformedPolicy::Reject => "reject",
            MalformedPolicy::Accept => "accept",
        }
    }
}

/// Body parser configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Only accept objects and arrays at the top level.
    pub strict: bool,

    /// Policy for bodies that fail decoding.
    pub on_malformed: MalformedPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict: true,
            on_malformed: MalformedPolicy::Reject,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes, enforced by the transport layer.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Answer every origin with permissive CORS headers.
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A notification route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path pattern: literal segments, `{name}` or `:name` for one segment,
    /// trailing `*` or `{*name}` for the rest of the path.
    pub pattern: String,

    /// Acknowledgement message returned to the caller.
    pub message: String,

    /// Accepted HTTP method.
    #[serde(default = "default_method")]
    pub method: String,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,
}

fn default_method() -> String {
    "POST".to_string()
}

/// The three notification routes the service has always exposed.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            name: "notificaciones".to_string(),
            pattern: "/interfazpagos/api/notificaciones".to_string(),
            message: "POST recibido en /notificaciones".to_string(),
            method: default_method(),
            priority: 0,
        },
        RouteConfig {
            name: "notificaciones_param".to_string(),
            pattern: "/interfazpagos/api/notificaciones/{param}".to_string(),
            message: "POST recibido en /notificaciones con parámetro".to_string(),
            method: default_method(),
            priority: 0,
        },
        RouteConfig {
            name: "notificaciones_wildcard".to_string(),
            pattern: "/interfazpagos/api/notificaciones/*".to_string(),
            message: "POST recibido en /notificaciones con multiples parámetros".to_string(),
            method: default_method(),
            priority: 0,
        },
    ]
}
