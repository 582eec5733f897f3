use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the log index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("search engine error: {0}")]
    Engine(#[from] tantivy::TantivyError),

    #[error("record #{index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("invalid filter on '{property}': {reason}")]
    InvalidFilter { property: String, reason: String },

    #[error("cannot sort by '{0}': only the creation time and number properties are sortable")]
    UnsortableProperty(String),

    #[error("snapshot I/O error on '{}': {source}", path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt snapshot '{}' at line {line}: {reason}", path.display())]
    CorruptSnapshot {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl IndexError {
    /// Whether the error was caused by the request rather than the engine
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotAnObject { .. }
                | Self::UnknownProperty(_)
                | Self::InvalidFilter { .. }
                | Self::UnsortableProperty(_)
        )
    }
}
