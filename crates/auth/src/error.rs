use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use helmsman_core::ecode::{Reply, INTERNAL_SERVER_ERROR, UNAUTHORIZED};
use thiserror::Error;

/// Auth errors for the helmsman_auth crate.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    /// Token signing failed
    #[error("token error: {0}")]
    Token(String),

    /// Password hashing failed
    #[error("password hash error: {0}")]
    Hash(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                tracing::debug!("Rejected request: {}", self);
                (StatusCode::UNAUTHORIZED, UNAUTHORIZED.with_msg(self.to_string()))
            }
            AuthError::Token(_) | AuthError::Hash(_) => {
                tracing::error!("Auth error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
            }
        };

        (status, Json(Reply::<()>::error(&code))).into_response()
    }
}
