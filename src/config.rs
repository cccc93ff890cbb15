use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Qolboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "qolboard=info,qolboard_lib=info,tower_http=info"
}

/// Get the application data directory
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qolboard")
}

/// Default location of the SQLite database
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("qolboard.db")
}

// ═══════════════════════════════════════════════════════════
// Engine configuration
// ═══════════════════════════════════════════════════════════

/// Tunable scoring parameters. Slider bounds are fixed by the schema and
/// live in `models::sliders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Substituted for missing or unparseable slider readings.
    pub default_slider: u8,
    /// Allowed distance of an allocation total from 100.
    pub allocation_tolerance: f64,
    /// Per-metric percent change that earns a feedback highlight.
    pub feedback_highlight_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_slider: 6,
            allocation_tolerance: 0.1,
            feedback_highlight_threshold: 5.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server configuration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("QOLBOARD_PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),
    #[error("QOLBOARD_HOST must be an IP address or 'localhost', got '{0}'")]
    InvalidHost(String),
}

/// Settings for the HTTP binary, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub engine: EngineConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env::var("QOLBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port_raw = env::var("QOLBOARD_PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;
        let database_path = env::var("QOLBOARD_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        Ok(Self {
            host,
            port,
            database_path,
            engine: EngineConfig::default(),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
