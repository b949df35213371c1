use std::time::Duration;

const DEV_SECRET: &str = "helmsman-development-secret";

/// Token and password settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub issuer: String,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Creates a config with the given secret and default settings.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            issuer: "helmsman".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: Signing secret (default: a development secret, logged as a warning)
    /// - `JWT_TTL_HOURS`: Token lifetime in hours (default: 24)
    /// - `JWT_ISSUER`: Token issuer (default: `helmsman`)
    /// - `BCRYPT_COST`: Password hash cost (default: `bcrypt::DEFAULT_COST`)
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_SECRET.to_string()
            }
        };

        let token_ttl = std::env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|hours| Duration::from_secs(hours * 60 * 60))
            .unwrap_or(Duration::from_secs(24 * 60 * 60));

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| "helmsman".to_string());

        let bcrypt_cost = std::env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        Self {
            jwt_secret,
            token_ttl,
            issuer,
            bcrypt_cost,
        }
    }
}
