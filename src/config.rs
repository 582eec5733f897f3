use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pinorama_client::ClientOptions;
use pinorama_server::ServerConfig;
use pinorama_studio::{Locale, StudioOptions, TimeZoneMode};
use serde::Deserialize;

/// Contents of the TOML config file
///
/// Every section is optional; missing keys keep their defaults and CLI flags
/// are applied on top.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientSection,
    pub studio: StudioSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientSection {
    pub url: Option<String>,
    pub admin_secret: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub backoff_factor: Option<f64>,
    pub backoff_max_ms: Option<u64>,
}

impl ClientSection {
    pub fn options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            url: self.url.clone().unwrap_or(defaults.url),
            admin_secret: self.admin_secret.clone(),
            timeout: self.timeout_ms.map(Duration::from_millis).unwrap_or(defaults.timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            backoff: self.backoff_ms.map(Duration::from_millis).unwrap_or(defaults.backoff),
            backoff_factor: self.backoff_factor.unwrap_or(defaults.backoff_factor),
            backoff_max: self
                .backoff_max_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_max),
        }
    }
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StudioSection {
    pub live: bool,
    pub poll_interval_ms: Option<u64>,
    /// Language tag such as `en` or `it-IT`
    pub lang: Option<String>,
    pub utc: bool,
    pub facet_limit: Option<usize>,
}

impl StudioSection {
    pub fn options(&self) -> StudioOptions {
        let defaults = StudioOptions::default();
        StudioOptions {
            poll_interval: self
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            live: self.live,
            locale: resolve_locale(None, self.lang.as_deref(), None),
            time_zone: if self.utc { TimeZoneMode::Utc } else { TimeZoneMode::Local },
            facet_limit: self.facet_limit.unwrap_or(defaults.facet_limit),
            ..defaults
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSection {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Directory of the studio log file
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl Config {
    /// Load `path`, or the default location when it exists
    ///
    /// An explicit path must exist; a missing default file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Directory of the studio log file
    pub fn log_dir(&self) -> PathBuf {
        self.logging.dir.clone().unwrap_or_else(data_dir)
    }
}

/// `~/.pinorama/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pinorama").join("config.toml"))
}

/// Per-user data directory, falling back to the working directory
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("pinorama"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".pinorama")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// First recognised tag of the flag, the config file and `LANG`
pub fn resolve_locale(flag: Option<&str>, config: Option<&str>, env: Option<&str>) -> Locale {
    [flag, config, env]
        .into_iter()
        .flatten()
        .find_map(Locale::from_tag)
        .unwrap_or_default()
}
