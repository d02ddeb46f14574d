//! Error types for Maktaba services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,
    InvalidDecision,
    DuplicateReview,
    SelfFollow,

    // Authentication errors (2xxx)
    Unauthorized,
    InvalidToken,
    ExpiredToken,
    InvalidCredentials,
    NotOwner,

    // Authorization errors (3xxx)
    Forbidden,
    AdminRequired,

    // Resource errors (4xxx)
    NotFound,
    BookNotFound,
    ReviewNotFound,
    ReplyNotFound,
    UserNotFound,
    HighlightNotFound,

    // Conflict errors (5xxx)
    Conflict,
    DuplicateFollow,
    DuplicateUser,

    // Rate limiting (6xxx)
    RateLimited,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,
    TransactionError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,
            ErrorCode::InvalidDecision => 1004,
            ErrorCode::DuplicateReview => 1005,
            ErrorCode::SelfFollow => 1006,

            // Auth (2xxx)
            ErrorCode::Unauthorized => 2001,
            ErrorCode::InvalidToken => 2002,
            ErrorCode::ExpiredToken => 2003,
            ErrorCode::InvalidCredentials => 2004,
            ErrorCode::NotOwner => 2005,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,
            ErrorCode::AdminRequired => 3002,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::BookNotFound => 4002,
            ErrorCode::ReviewNotFound => 4003,
            ErrorCode::ReplyNotFound => 4004,
            ErrorCode::UserNotFound => 4005,
            ErrorCode::HighlightNotFound => 4006,

            // Conflicts (5xxx)
            ErrorCode::Conflict => 5001,
            ErrorCode::DuplicateFollow => 5002,
            ErrorCode::DuplicateUser => 5003,

            // Rate limits (6xxx)
            ErrorCode::RateLimited => 6001,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,
            ErrorCode::TransactionError => 7003,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // A moderation decision must be APPROVED or REJECTED
    #[error("Invalid moderation decision: {value}")]
    InvalidDecision { value: String },

    // One non-deleted review per (user, book); clients receive 400
    #[error("A review for this book already exists")]
    DuplicateReview,

    #[error("Users cannot follow themselves")]
    SelfFollow,

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    // Ownership failures respond 401, not 403
    #[error("Not the owner of this resource")]
    NotOwner,

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Admin privileges required")]
    AdminRequired,

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Book not found: {id}")]
    BookNotFound { id: String },

    #[error("Review not found: {id}")]
    ReviewNotFound { id: String },

    #[error("Reply not found: {id}")]
    ReplyNotFound { id: String },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Highlight not found: {id}")]
    HighlightNotFound { id: String },

    // Conflict errors
    #[error("Duplicate resource: {message}")]
    Duplicate { message: String },

    #[error("Already following this user")]
    DuplicateFollow,

    #[error("Username or email already registered")]
    DuplicateUser,

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::InvalidDecision { .. } => ErrorCode::InvalidDecision,
            AppError::DuplicateReview => ErrorCode::DuplicateReview,
            AppError::SelfFollow => ErrorCode::SelfFollow,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::ExpiredToken => ErrorCode::ExpiredToken,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::NotOwner => ErrorCode::NotOwner,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::AdminRequired => ErrorCode::AdminRequired,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::BookNotFound { .. } => ErrorCode::BookNotFound,
            AppError::ReviewNotFound { .. } => ErrorCode::ReviewNotFound,
            AppError::ReplyNotFound { .. } => ErrorCode::ReplyNotFound,
            AppError::UserNotFound { .. } => ErrorCode::UserNotFound,
            AppError::HighlightNotFound { .. } => ErrorCode::HighlightNotFound,
            AppError::Duplicate { .. } => ErrorCode::Conflict,
            AppError::DuplicateFollow => ErrorCode::DuplicateFollow,
            AppError::DuplicateUser => ErrorCode::DuplicateUser,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. }
            | AppError::InvalidDecision { .. }
            | AppError::DuplicateReview
            | AppError::SelfFollow => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. }
            | AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::InvalidCredentials
            | AppError::NotOwner => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden { .. } | AppError::AdminRequired => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::NotFound { .. }
            | AppError::BookNotFound { .. }
            | AppError::ReviewNotFound { .. }
            | AppError::ReplyNotFound { .. }
            | AppError::UserNotFound { .. }
            | AppError::HighlightNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Duplicate { .. } | AppError::DuplicateFollow | AppError::DuplicateUser => {
                StatusCode::CONFLICT
            }

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = if self.is_server_error() {
            // Never leak driver messages to the client
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                details: None,
                request_id: None, // Should be filled by middleware
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::BookNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::BookNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_review_is_bad_request() {
        // A second review for the same (user, book) is 400, not 409
        let err = AppError::DuplicateReview;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_ownership_failure_is_unauthorized() {
        let err = AppError::NotOwner;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_follow_edge_is_generic_not_found() {
        // Unfollowing a non-followed user reports the edge as missing,
        // not the user
        let err = AppError::NotFound {
            resource_type: "follow".into(),
            id: "f00".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.to_string().contains("follow"));
    }

    #[test]
    fn test_duplicate_follow_is_conflict() {
        let err = AppError::DuplicateFollow;
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code().as_code(), 5002);
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "Something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }
}
