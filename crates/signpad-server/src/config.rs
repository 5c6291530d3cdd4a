//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid SIGNPAD_ADDR {value:?}: {reason}")]
    Addr { value: String, reason: String },
}

/// Listen address and optional storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// File-backed storage when set, in-memory otherwise.
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `SIGNPAD_ADDR` and `SIGNPAD_DATA_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("SIGNPAD_ADDR").ok(),
            std::env::var("SIGNPAD_DATA_DIR").ok(),
        )
    }

    fn from_vars(addr: Option<String>, data_dir: Option<String>) -> Result<Self, ConfigError> {
        let value = addr.unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Addr {
            value: value.clone(),
            reason: e.to_string(),
        })?;
        let data_dir = data_dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from);
        Ok(Self { addr, data_dir })
    }
}
