//! Process configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::backend::BackendConfig;
use crate::catalog::SnapshotConfig;

pub const BACKEND_URL_VAR: &str = "DIASPORA_BACKEND_URL";
pub const BACKEND_KEY_VAR: &str = "DIASPORA_BACKEND_KEY";
pub const BIND_ADDR_VAR: &str = "DIASPORA_BIND_ADDR";
pub const CATALOG_SNAPSHOT_VAR: &str = "DIASPORA_CATALOG_SNAPSHOT";
pub const MOCK_DIR_VAR: &str = "DIASPORA_MOCK_DIR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Error from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set (set DIASPORA_MOCK_DIR to run against fixtures instead)")]
    Missing(&'static str),

    #[error("invalid DIASPORA_BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Where trips and reference data come from.
#[derive(Debug, Clone)]
pub enum BackendMode {
    Remote(BackendConfig),
    /// JSON fixtures in this directory.
    Mock(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendMode,
    pub snapshot: Option<SnapshotConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_value = var(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_value.clone(),
                source,
            })?;

        let backend = match var(MOCK_DIR_VAR) {
            Some(dir) => BackendMode::Mock(PathBuf::from(dir)),
            None => {
                let url = var(BACKEND_URL_VAR).ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;
                let key = var(BACKEND_KEY_VAR).ok_or(ConfigError::Missing(BACKEND_KEY_VAR))?;
                BackendMode::Remote(BackendConfig::new(url.trim(), key.trim()))
            }
        };

        let snapshot = var(CATALOG_SNAPSHOT_VAR).map(SnapshotConfig::new);

        Ok(Self {
            bind_addr,
            backend,
            snapshot,
        })
    }
}
