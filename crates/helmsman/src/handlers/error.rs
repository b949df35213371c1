use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use helmsman_auth::AuthError;
use helmsman_core::ecode::{
    ErrorCode, Reply, ALREADY_EXISTS, INTERNAL_SERVER_ERROR, INVALID_PARAMS, NOT_FOUND,
    UNAUTHORIZED,
};
use helmsman_core::query::QueryError;
use helmsman_core::storage::RepositoryError;

/// Handler error.
///
/// Classified errors are answered with HTTP 200 and their application code in
/// the envelope. Everything else is logged and answered with HTTP 500.
#[derive(Debug)]
pub enum AppError {
    Business(ErrorCode),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Business(code) => (StatusCode::OK, Json(Reply::<()>::error(&code))).into_response(),
            AppError::Internal(err) => {
                let status = err
                    .downcast_ref::<RepositoryError>()
                    .map_or(StatusCode::INTERNAL_SERVER_ERROR, |err| {
                        classify_repository_error(err).1
                    });
                tracing::error!(error = %err, status = status.as_u16(), "Application error");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Reply::<()>::error(&INTERNAL_SERVER_ERROR)),
                )
                    .into_response()
            }
        }
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        AppError::Business(code)
    }
}

/// Envelope code of a repository error, and the HTTP status it stands for.
///
/// Only errors classified as internal are answered with their status; for
/// the others the status is diagnostic and goes to the log.
pub fn classify_repository_error(err: &RepositoryError) -> (ErrorCode, StatusCode) {
    match err {
        RepositoryError::NotFound { .. } => (NOT_FOUND, StatusCode::NOT_FOUND),
        RepositoryError::InvalidArgument(_) | RepositoryError::InvalidData(_) => {
            (INVALID_PARAMS, StatusCode::BAD_REQUEST)
        }
        RepositoryError::AlreadyExists { .. } => (ALREADY_EXISTS, StatusCode::CONFLICT),
        RepositoryError::ConnectionFailed(_) => {
            (INTERNAL_SERVER_ERROR, StatusCode::SERVICE_UNAVAILABLE)
        }
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => {
            (INTERNAL_SERVER_ERROR, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let (code, status) = classify_repository_error(&err);
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(error = %err, status = status.as_u16(), "Not found");
            AppError::Business(code)
        } else if status.is_client_error() {
            tracing::warn!(error = %err, status = status.as_u16(), "Rejected request");
            AppError::Business(code)
        } else {
            AppError::Internal(err.into())
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        tracing::warn!(error = %err, "Invalid query");
        AppError::Business(INVALID_PARAMS)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "Invalid JSON body");
        AppError::Business(INVALID_PARAMS)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "Invalid path parameter");
        AppError::Business(INVALID_PARAMS)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "Invalid query string");
        AppError::Business(INVALID_PARAMS)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                AppError::Business(UNAUTHORIZED.with_msg(err.to_string()))
            }
            AuthError::Token(_) | AuthError::Hash(_) => AppError::Internal(err.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_is_business_code() {
        let (status, json) = body(RepositoryError::not_found("trades", 9u64).into()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100004);
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_invalid_argument_is_invalid_params() {
        let err = RepositoryError::InvalidArgument("trades key cannot be 0".to_string());
        let (status, json) = body(err.into()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100001);
    }

    #[tokio::test]
    async fn test_already_exists_code() {
        let err = RepositoryError::AlreadyExists {
            entity_type: "users",
            id: "ana".to_string(),
        };
        let (status, json) = body(err.into()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100005);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let err = RepositoryError::QueryFailed("disk I/O error".to_string());
        let (status, json) = body(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], 100003);
        assert_eq!(json["msg"], "Internal Server Error");
    }

    #[test]
    fn test_classify_repository_error() {
        let cases = [
            (RepositoryError::not_found("tags", 3u64), 100004, StatusCode::NOT_FOUND),
            (
                RepositoryError::InvalidData("bad timestamp".to_string()),
                100001,
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::ConnectionFailed("pool timed out".to_string()),
                100003,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RepositoryError::Serialization("eof".to_string()),
                100003,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, code, status) in cases {
            let (got_code, got_status) = classify_repository_error(&err);
            assert_eq!(got_code.code, code, "{err}");
            assert_eq!(got_status, status, "{err}");
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_is_internal() {
        let err = RepositoryError::ConnectionFailed("pool timed out".to_string());
        let (status, json) = body(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], 100003);
    }

    #[tokio::test]
    async fn test_query_error_is_invalid_params() {
        let (status, json) = body(QueryError::UnknownColumn("x".to_string()).into()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100001);
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (status, json) = body(AuthError::TokenExpired.into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100002);

        let (status, _) = body(AuthError::Hash("cost out of range".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
