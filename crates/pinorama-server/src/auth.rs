use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use pinorama_types::ADMIN_SECRET_HEADER;

use crate::{ServerError, ServerState};

/// Reject requests without the configured admin secret
pub async fn require_admin_secret(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(secret) = &state.admin_secret {
        let provided = request
            .headers()
            .get(ADMIN_SECRET_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        if !secret_matches(provided, secret) {
            return Err(ServerError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

/// Compare without short-circuiting on the first differing byte
fn secret_matches(provided: &[u8], secret: &str) -> bool {
    provided.ct_eq(secret.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_matches() {
        assert!(secret_matches(b"s3cret", "s3cret"));
        assert!(!secret_matches(b"s3creT", "s3cret"));
        assert!(!secret_matches(b"s3cre", "s3cret"));
        assert!(!secret_matches(b"", "s3cret"));
    }
}
