use serde::{Deserialize, Serialize};

use super::{ErrorCode, SUCCESS};

/// Uniform response envelope.
///
/// `code` is zero on success. `data` is omitted on errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply<T> {
    pub code: i32,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Reply<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS.code,
            msg: SUCCESS.msg.to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: &ErrorCode) -> Self {
        Self {
            code: code.code,
            msg: code.msg.to_string(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS.code
    }
}
