//! HS256 access tokens.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::{AuthConfig, AuthError};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id.
    pub uid: u64,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues a signed token for a user.
pub fn issue_token(config: &AuthConfig, uid: u64) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let ttl = i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = Claims {
        uid,
        iss: config.issuer.clone(),
        iat: now,
        exp: now.saturating_add(ttl),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AuthError::Token(e.to_string()))
}

/// Verifies a token's signature, issuer and expiry.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("test-secret")
    }

    #[test]
    fn test_issue_and_verify() {
        let token = issue_token(&config(), 42).unwrap();
        let claims = verify_token(&config(), &token).unwrap();

        assert_eq!(claims.uid, 42);
        assert_eq!(claims.iss, "helmsman");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&config(), 1).unwrap();
        let other = AuthConfig::new("another-secret");

        assert!(matches!(
            verify_token(&other, &token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = issue_token(&config(), 1).unwrap();
        let mut other = config();
        other.issuer = "someone-else".to_string();

        assert!(matches!(
            verify_token(&other, &token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            uid: 1,
            iss: "helmsman".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&config(), &token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            verify_token(&config(), "not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
