use serde::{Deserialize, Serialize};

/// HTTP server settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on
    pub bind: String,

    pub port: u16,

    /// Exposition endpoint scraped by Prometheus
    pub metrics_path: String,

    /// Liveness endpoint
    pub health_path: String,

    /// Requests running longer than this are answered with 408
    pub request_timeout_ms: u64,

    /// Bearer token for the vessel admin endpoints. None = unrestricted.
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            metrics_path: "/metrics".to_string(),
            health_path: "/health".to_string(),
            request_timeout_ms: 5000,
            admin_token: None,
        }
    }
}

impl ServerConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
