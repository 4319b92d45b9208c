//! Authentication error types
//!
//! Every failure in the account core carries a kind the request boundary can
//! pattern-match on. Errors are designed to be:
//! - Informative for logging/debugging
//! - Safe for external exposure (no sensitive data leakage)
//! - Convertible to HTTP status codes

use serde::{Deserialize, Serialize};
use thiserror::Error;

use streamnest_db::DbError;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Malformed or missing input; user-correctable, carries every violation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Username or email already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Password mismatch
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No account matches the identifier or claim
    #[error("Account not found")]
    AccountNotFound,

    // =========================================================================
    // Token Errors
    // =========================================================================
    /// No token was presented where one is required
    #[error("No token presented")]
    MissingToken,

    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is invalid (malformed, wrong signature, etc.)
    #[error("Invalid token")]
    InvalidToken,

    /// Token kind mismatch (expected access, got refresh, etc.)
    #[error("Invalid token type")]
    InvalidTokenType,

    /// Presented refresh token does not match the stored one. Treated as a
    /// reuse/forgery signal, not a transient fault.
    #[error("Refresh token mismatch")]
    TokenMismatch,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Required media upload failed
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) => 400,

            // 401 Unauthorized
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidTokenType
            | Self::TokenMismatch => 401,

            // 404 Not Found
            Self::AccountNotFound => 404,

            // 409 Conflict
            Self::Conflict(_) => 409,

            // 500 Internal Server Error
            Self::Upload(_)
            | Self::PasswordHashingFailed
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidTokenType => "INVALID_TOKEN_TYPE",
            Self::TokenMismatch => "TOKEN_MISMATCH",
            Self::Upload(_) => "UPLOAD_FAILED",
            Self::PasswordHashingFailed => "INTERNAL_ERROR",
            Self::Database(_) => "INTERNAL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::PasswordHashingFailed => {
                "An internal error occurred".to_string()
            }
            Self::Upload(_) => "Media upload failed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error response for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub code: String,
    /// Error message (human-readable)
    pub message: String,
    /// Per-field violations (for validation failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        let details = match error {
            AuthError::Validation(violations) => Some(violations.clone()),
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.client_message(),
            details,
        }
    }
}

// Implement conversion from common error types
impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => Self::Conflict(msg),
            DbError::NotFound(_) => Self::AccountNotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation(vec!["email is required".to_string()]).status_code(),
            400
        );
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::TokenMismatch.status_code(), 401);
        assert_eq!(AuthError::AccountNotFound.status_code(), 404);
        assert_eq!(AuthError::Conflict("email taken".to_string()).status_code(), 409);
        assert_eq!(AuthError::Database("test".to_string()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(AuthError::MissingToken.error_code(), "MISSING_TOKEN");
        assert_eq!(
            AuthError::Database("secret info".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_client_message_hides_internal_details() {
        let err = AuthError::Database("connection string with password".to_string());
        assert!(!err.client_message().contains("password"));
        assert_eq!(err.client_message(), "An internal error occurred");
    }

    #[test]
    fn test_validation_details() {
        let err = AuthError::Validation(vec![
            "email is required".to_string(),
            "password must contain a digit".to_string(),
        ]);
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "VALIDATION_FAILED");
        assert_eq!(response.details.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_db_duplicate_maps_to_conflict() {
        let err = AuthError::from(DbError::Duplicate("email x taken".to_string()));
        assert!(matches!(err, AuthError::Conflict(_)));
        assert_eq!(err.status_code(), 409);
    }
}
