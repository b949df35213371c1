//! Token authentication for helmsman.
//!
//! This crate provides:
//! - HS256 token issuance and verification
//! - bcrypt password hashing
//! - A bearer-token middleware and the `AuthUser` extractor

mod config;
mod error;
mod extractors;
mod middleware;
mod password;
mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use middleware::require_auth;
pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token, Claims};
