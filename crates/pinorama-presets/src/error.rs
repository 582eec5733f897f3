use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating presets
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("unknown preset '{0}'")]
    Unknown(String),

    #[error("failed to read preset file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in preset '{name}': {source}")]
    Toml {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON in preset '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported preset file '{}' (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("preset '{preset}' cannot extend '{base}'")]
    InvalidBase { preset: String, base: String },

    #[error("preset '{preset}' references properties missing from its schema: {}", properties.join(", "))]
    UnknownProperties {
        preset: String,
        properties: Vec<String>,
    },
}
