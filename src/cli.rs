use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use pinorama_client::{BulkQueueOptions, ClientOptions};
use pinorama_server::ServerConfig;
use pinorama_studio::{StudioOptions, TimeZoneMode};

use crate::config::{resolve_locale, ClientSection, StudioSection};

/// Pinorama - ingest, search and explore structured logs
#[derive(Parser, Debug)]
#[command(name = "pinorama")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.pinorama/config.toml)
    #[arg(long, global = true, env = "PINORAMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Open the terminal log explorer
    Studio(StudioArgs),
    /// Send newline-delimited logs from stdin or a file to a server
    Ingest(IngestArgs),
    /// List the built-in presets or print one as JSON
    Presets(PresetsArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path prefix all routes are mounted under
    #[arg(long)]
    pub prefix: Option<String>,

    /// Snapshot file restored on startup and written on shutdown
    #[arg(long, value_name = "FILE")]
    pub db_path: Option<PathBuf>,

    #[arg(long, env = "PINORAMA_ADMIN_SECRET", hide_env_values = true)]
    pub admin_secret: Option<String>,

    /// Built-in preset describing the records
    #[arg(long)]
    pub preset: Option<String>,

    /// Custom preset file (.toml or .json)
    #[arg(long, value_name = "FILE")]
    pub preset_file: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long)]
    pub body_limit: Option<usize>,
}

impl ServeArgs {
    pub fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        if self.db_path.is_some() {
            config.db_path = self.db_path;
        }
        if self.admin_secret.is_some() {
            config.admin_secret = self.admin_secret;
        }
        if let Some(preset) = self.preset {
            config.preset = preset;
        }
        if self.preset_file.is_some() {
            config.preset_file = self.preset_file;
        }
        if let Some(limit) = self.body_limit {
            config.body_limit = limit;
        }
    }
}

/// Server connection flags shared by the client commands
#[derive(Args, Debug, Default)]
pub struct ConnectArgs {
    /// Server URL, including any route prefix
    #[arg(short, long, env = "PINORAMA_URL")]
    pub url: Option<String>,

    #[arg(long, env = "PINORAMA_ADMIN_SECRET", hide_env_values = true)]
    pub admin_secret: Option<String>,
}

impl ConnectArgs {
    pub fn client_options(self, section: &ClientSection) -> ClientOptions {
        let mut options = section.options();
        if let Some(url) = self.url {
            options.url = url;
        }
        if self.admin_secret.is_some() {
            options.admin_secret = self.admin_secret;
        }
        options
    }
}

#[derive(Args, Debug, Default)]
pub struct StudioArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Start in live mode
    #[arg(long)]
    pub live: bool,

    /// Live-mode poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Interface language (en, it)
    #[arg(long)]
    pub lang: Option<String>,

    /// Show timestamps in UTC
    #[arg(long)]
    pub utc: bool,
}

impl StudioArgs {
    /// Studio settings; `env_lang` is the value of `LANG`
    pub fn studio_options(&self, section: &StudioSection, env_lang: Option<&str>) -> StudioOptions {
        let mut options = section.options();
        options.live |= self.live;
        if let Some(ms) = self.poll_interval {
            options.poll_interval = Duration::from_millis(ms);
        }
        if self.utc {
            options.time_zone = TimeZoneMode::Utc;
        }
        options.locale = resolve_locale(self.lang.as_deref(), section.lang.as_deref(), env_lang);
        options
    }
}

#[derive(Args, Debug, Default)]
pub struct IngestArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Read from this file instead of stdin
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Records per bulk request
    #[arg(long, default_value = "1000")]
    pub batch_size: usize,

    /// Maximum delay before buffered records are sent, in milliseconds
    #[arg(long, value_name = "MS", default_value = "5000")]
    pub flush_interval: u64,

    /// Echo every input line to stdout
    #[arg(long)]
    pub pipe: bool,
}

impl IngestArgs {
    pub fn queue_options(&self) -> BulkQueueOptions {
        BulkQueueOptions {
            batch_size: self.batch_size,
            flush_interval: Duration::from_millis(self.flush_interval),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PresetsArgs {
    /// Preset to print; lists all presets when omitted
    pub name: Option<String>,

    /// Load and print a custom preset file instead
    #[arg(long, value_name = "FILE", conflicts_with = "name")]
    pub file: Option<PathBuf>,
}
