//! Server configuration module

use serde::{Deserialize, Serialize};
use std::env;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Maximum JSON payload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0, // Use all CPU cores
            max_payload_size: default_max_payload_size(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Override host, port and workers from `SERVER_HOST`, `SERVER_PORT`
    /// and `SERVER_WORKERS`; unparsable values keep the current setting.
    pub fn merge_env(mut self) -> Self {
        if let Ok(host) = env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(workers) = env::var("SERVER_WORKERS").ok().and_then(|w| w.parse().ok()) {
            self.workers = workers;
        }
        self
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_max_payload_size() -> usize {
    16 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.workers, 0);
    }
}
