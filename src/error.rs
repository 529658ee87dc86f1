// src/error.rs
use rocket::http::Status;
use thiserror::Error;

use crate::service::MAX_ACTIVE_ADVERTISEMENTS;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("A user can have at most {} active advertisements", MAX_ACTIVE_ADVERTISEMENTS)]
    QuotaExceeded,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("A candidate with the same email already exists. If you have any question please contact the admin")]
    IdentityConflict,

    #[error("You can only apply once for each advertisement")]
    DuplicateApplication,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::QuotaExceeded => "QUOTA_EXCEEDED",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::IdentityConflict => "IDENTITY_CONFLICT",
            AppError::DuplicateApplication => "DUPLICATE_APPLICATION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AppError::InvalidRequest(_)
            | AppError::QuotaExceeded
            | AppError::AlreadyExists(_)
            | AppError::IdentityConflict
            | AppError::DuplicateApplication => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Forbidden(_) => Status::Forbidden,
            AppError::Database(_) | AppError::Internal(_) => Status::InternalServerError,
        }
    }

    /// Message safe to show to API clients
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            AppError::InvalidRequest(_) => &["Check the request body and required fields"],
            AppError::QuotaExceeded => &["Deactivate another advertisement first"],
            AppError::AlreadyExists(_) => &["Remove the id field to create a new record"],
            AppError::IdentityConflict => &[
                "Use the same first and last name as your previous applications",
                "Contact the admin if your name changed",
            ],
            AppError::DuplicateApplication => &["Pick a different advertisement"],
            AppError::NotFound(_) => &["Check the identifier"],
            AppError::Forbidden(_) => &["Sign in with an account allowed to do this"],
            AppError::Database(_) | AppError::Internal(_) => &[
                "Try again in a few moments",
                "Contact support if the problem persists",
            ],
        };
        hints.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_failures_are_bad_requests() {
        for err in [
            AppError::invalid("missing id"),
            AppError::QuotaExceeded,
            AppError::AlreadyExists("has id".to_string()),
            AppError::IdentityConflict,
            AppError::DuplicateApplication,
        ] {
            assert_eq!(err.status(), Status::BadRequest, "{}", err.code());
        }
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.code(), "DATABASE_ERROR");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_quota_message_names_the_cap() {
        assert_eq!(
            AppError::QuotaExceeded.to_string(),
            "A user can have at most 10 active advertisements"
        );
    }
}
