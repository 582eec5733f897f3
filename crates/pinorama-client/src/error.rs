use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server URL '{0}'")]
    InvalidUrl(String),

    #[error("admin secret is not a valid header value")]
    InvalidSecret,

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ClientError>,
    },

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("bulk queue is closed")]
    QueueClosed,
}

impl ClientError {
    /// Status code of the server response that caused the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}
