use std::path::PathBuf;
use std::sync::Arc;

use pinorama_index::LogIndex;
use pinorama_types::Introspection;

use crate::styles::stylesheet;
use crate::{ServerConfig, ServerError};

/// State shared by all request handlers
pub struct ServerState {
    pub index: Arc<LogIndex>,
    pub introspection: Introspection,
    /// Generated once from the introspection styles
    pub stylesheet: String,
    pub admin_secret: Option<String>,
    pub db_path: Option<PathBuf>,
}

impl ServerState {
    pub fn new(introspection: Introspection, config: &ServerConfig) -> Result<Self, ServerError> {
        let index = LogIndex::new(&introspection.db_schema)?;
        Ok(Self {
            index: Arc::new(index),
            stylesheet: stylesheet(&introspection),
            introspection,
            admin_secret: config.admin_secret.clone().filter(|s| !s.is_empty()),
            db_path: config.db_path.clone(),
        })
    }

    /// State for the configured preset (a preset file wins over a name)
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let preset = match &config.preset_file {
            Some(path) => pinorama_presets::load_file(path)?,
            None => pinorama_presets::find(&config.preset)?,
        };
        tracing::info!(preset = %preset.name, "Using preset");
        Self::new(preset.introspection, config)
    }

    /// Restore the snapshot, if persistence is enabled
    pub async fn restore(&self) -> Result<usize, ServerError> {
        let Some(path) = self.db_path.clone() else {
            return Ok(0);
        };
        let index = self.index.clone();
        Ok(tokio::task::spawn_blocking(move || index.load_snapshot(&path)).await??)
    }

    /// Write the snapshot now
    pub async fn persist(&self) -> Result<usize, ServerError> {
        let path = self
            .db_path
            .clone()
            .ok_or(ServerError::PersistenceDisabled)?;
        let index = self.index.clone();
        Ok(tokio::task::spawn_blocking(move || index.save_snapshot(&path)).await??)
    }
}
