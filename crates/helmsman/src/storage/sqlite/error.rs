//! SQLite error mapping.
//!
//! Maps `sqlx::Error` to `RepositoryError` from `helmsman_core::storage`.
//! Specific errors are mapped to semantic variants (e.g., UNIQUE constraint to AlreadyExists).

use helmsman_core::storage::RepositoryError;

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - UNIQUE/PRIMARY KEY constraint → `RepositoryError::AlreadyExists`
/// - FOREIGN KEY, NOT NULL and CHECK constraints → `RepositoryError::InvalidData`
/// - Pool and I/O errors → `RepositoryError::ConnectionFailed`
/// - Row decoding errors → `RepositoryError::InvalidData`
/// - All other errors → `RepositoryError::QueryFailed`
pub fn map_sqlx_error(err: sqlx::Error, entity_type: &'static str) -> RepositoryError {
    map_sqlx_error_with_id(err, entity_type, "unknown")
}

/// Maps a sqlx error with a known ID to a RepositoryError.
pub fn map_sqlx_error_with_id(
    err: sqlx::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::AlreadyExists {
            entity_type,
            id: id.into(),
        },
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::InvalidData(format!(
                "Foreign key constraint violation for {entity_type}"
            ))
        }
        sqlx::Error::Database(db) if db.is_check_violation() => {
            RepositoryError::InvalidData(db.message().to_string())
        }
        sqlx::Error::RowNotFound => RepositoryError::NotFound {
            entity_type,
            id: id.into(),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(err.to_string())
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => RepositoryError::InvalidData(err.to_string()),
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let result = map_sqlx_error_with_id(sqlx::Error::RowNotFound, "trades", "12");

        match result {
            RepositoryError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "trades");
                assert_eq!(id, "12");
            }
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_pool_timeout_maps_to_connection_failed() {
        let result = map_sqlx_error(sqlx::Error::PoolTimedOut, "users");
        assert!(matches!(result, RepositoryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_decode_maps_to_invalid_data() {
        let result = map_sqlx_error(sqlx::Error::ColumnNotFound("pnl".to_string()), "trades");
        assert!(matches!(result, RepositoryError::InvalidData(_)));
    }

    #[test]
    fn test_protocol_error_maps_to_query_failed() {
        let result = map_sqlx_error(sqlx::Error::Protocol("unexpected".to_string()), "tags");
        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
