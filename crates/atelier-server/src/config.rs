//! Configuration file management.
//!
//! TOML file at `$ATELIER_CONFIG` (default `atelier.toml`); a missing
//! file means defaults. Every section and key is optional.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sharing settings.
    #[serde(default)]
    pub sharing: SharingConfig,
}

/// HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = current directory.
    #[serde(default)]
    pub data_dir: String,
}

/// Sharing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Base URL used when rendering share-link URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Deadline for access resolution; on timeout the request fails
    /// closed.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
}

impl ServerConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("ATELIER_CONFIG").unwrap_or_else(|_| "atelier.toml".to_string());
        let path = PathBuf::from(path);
        if !path.exists() {
            tracing::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
        }
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            resolve_timeout_ms: default_resolve_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_resolve_timeout_ms() -> u64 {
    3000
}
