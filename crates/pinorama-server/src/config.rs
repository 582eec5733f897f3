use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6200;
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Server settings, also the `[server]` section of the config file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path prefix all routes are mounted under
    pub prefix: String,
    /// Snapshot file; persistence is disabled when unset
    pub db_path: Option<PathBuf>,
    /// Required in the admin secret header when set
    pub admin_secret: Option<String>,
    /// Built-in preset describing the records
    pub preset: String,
    /// Custom preset file, takes precedence over `preset`
    pub preset_file: Option<PathBuf>,
    /// Maximum request body size in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            prefix: "/".to_string(),
            db_path: None,
            admin_secret: None,
            preset: pinorama_presets::DEFAULT_PRESET.to_string(),
            preset_file: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Prefix normalised to `/name` form, `None` for the root
    pub fn mount_path(&self) -> Option<String> {
        let trimmed = self.prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{}", trimmed))
        }
    }

    /// Base URL clients should use to reach this server
    pub fn public_url(&self, bound: SocketAddr) -> String {
        format!(
            "http://{}{}",
            bound,
            self.mount_path().unwrap_or_default()
        )
    }
}
