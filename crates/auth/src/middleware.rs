use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{extractors::bearer_token, verify_token, AuthConfig, AuthError, AuthUser};

/// Rejects requests without a valid bearer token.
///
/// On success the caller is stored in the request extensions as [`AuthUser`].
pub async fn require_auth(
    State(config): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?;
    let claims = verify_token(&config, token)?;

    request.extensions_mut().insert(AuthUser { uid: claims.uid });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue_token;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.uid.to_string()
    }

    fn app(config: Arc<AuthConfig>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(config.clone(), require_auth))
            .with_state(config)
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let config = Arc::new(AuthConfig::new("test-secret"));
        let token = issue_token(&config, 7).unwrap();

        let response = app(config)
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"7");
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let config = Arc::new(AuthConfig::new("test-secret"));

        let response = app(config)
            .oneshot(HttpRequest::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_rejected() {
        let config = Arc::new(AuthConfig::new("test-secret"));
        let forged = issue_token(&AuthConfig::new("attacker"), 7).unwrap();

        let response = app(config)
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(AUTHORIZATION, format!("Bearer {forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
