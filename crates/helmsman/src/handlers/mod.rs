pub mod accounts;
pub mod collections;
pub mod error;
pub mod extract;
pub mod health;
pub mod resource;
pub mod users;

use axum::Json;
use serde_json::Value;

use helmsman_core::ecode::Reply;

pub use error::AppError;

/// Result of a JSON API handler.
pub type ApiResult = Result<Json<Reply<Value>>, AppError>;
