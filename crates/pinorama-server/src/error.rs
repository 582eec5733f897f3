use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use pinorama_index::IndexError;
use pinorama_presets::PresetError;
use pinorama_types::ErrorBody;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error("missing or invalid admin secret")]
    Unauthorized,

    #[error("persistence is disabled: no database path configured")]
    PersistenceDisabled,

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("route not found")]
    NotFound,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Index(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::PersistenceDisabled | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
