//! Error types for questboard operations.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::ValidationError;

/// Errors that can occur during data store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStoreError {
    /// The requested record was not found in the data store.
    NotFound,
    /// A record with the same unique key already exists.
    AlreadyExists,
    /// A stored value could not be converted to its domain type.
    SerializationError(String),
    /// An internal storage system error occurred.
    Internal(String),
}

impl std::fmt::Display for DataStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Record not found in data store"),
            Self::AlreadyExists => write!(f, "Record already exists in data store"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<sqlx::Error> for DataStoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => DataStoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DataStoreError::AlreadyExists
            }
            _ => DataStoreError::Internal(e.to_string()),
        }
    }
}

impl std::error::Error for DataStoreError {}

/// An error response from an API handler.
///
/// Every failure leaving the HTTP layer is shaped as a status code plus a
/// JSON body of the form `{ "error": "<message>" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A 400 response for a request body that failed validation.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// A 404 response for a missing record.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// A 500 response. The message should stay generic; the underlying
    /// cause belongs in the server log, not the response body.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The client-visible message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<DataStoreError> for ApiError {
    fn from(e: DataStoreError) -> Self {
        // The cause is logged where it occurred; clients only see a generic
        // failure.
        match e {
            DataStoreError::NotFound => ApiError::not_found("Record not found"),
            _ => ApiError::internal("Storage operation failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_400() {
        let api: ApiError = ValidationError::missing_field("priority").into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.message().contains("priority"));
    }

    #[test]
    fn storage_internal_maps_to_generic_500() {
        let api: ApiError = DataStoreError::Internal("connection refused".to_string()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The database-level cause must never leak to the client.
        assert!(!api.message().contains("connection refused"));
    }

    #[test]
    fn sqlx_row_not_found_lowers_to_not_found() {
        let err: DataStoreError = sqlx::Error::RowNotFound.into();
        assert_eq!(err, DataStoreError::NotFound);
    }
}
