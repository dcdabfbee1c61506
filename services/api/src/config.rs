//! HTTP server configuration

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Listener settings for the API service
///
/// Read from an optional `config/api.{toml,yaml,json}` file, then from
/// `APP_`-prefixed environment variables (`APP_HOST`, `APP_PORT`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .add_source(File::with_name("config/api").required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
