use thiserror::Error;

/// Errors produced while turning request parameters into a store query.
///
/// These are always caused by client input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("column not allowed: {0}")]
    UnknownColumn(String),
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
    #[error("unsupported logic: {0}")]
    UnsupportedLogic(String),
    #[error("invalid value for {column}: {reason}")]
    InvalidValue { column: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display() {
        assert_eq!(
            QueryError::UnknownColumn("password".to_string()).to_string(),
            "column not allowed: password"
        );
        assert_eq!(
            QueryError::InvalidValue {
                column: "id".to_string(),
                reason: "expected a scalar".to_string(),
            }
            .to_string(),
            "invalid value for id: expected a scalar"
        );
    }
}
