use crate::config::env_or;
use crate::core::Result;

/// Server configuration for HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            workers: num_cpus::get(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::new("0.0.0.0".to_string(), 8080);

        Ok(Self {
            host: env_or("SERVER_HOST", defaults.host)?,
            port: env_or("SERVER_PORT", defaults.port)?,
            workers: env_or("SERVER_WORKERS", defaults.workers)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
