//! Error types for the coordination layer

use thiserror::Error;

use crate::identity::IdentityError;
use crate::profile::ProfileError;
use crate::session::SessionError;
use crate::utils::UtilError;

/// Errors that can occur while coordinating authentication and
/// user-management operations. Variants map one-to-one onto the HTTP
/// classifications the axum layer responds with.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Credential sign-in failed. Kept generic so responses cannot be
    /// used for account enumeration.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid session accompanied the request
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller is authenticated but lacks the admin role
    #[error("Admin access required")]
    Unauthorized,

    /// One or more fields failed validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The provider rejected a verification code
    #[error("{0}")]
    CodeRejected(String),

    /// An account with this email already exists in the profile table
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    /// Flow state is missing or expired (e.g. a stale login ticket)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found with context
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Identity provider failure outside the mapped classifications
    #[error("Provider error: {0}")]
    Provider(String),

    /// Error from session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// Log the error and return self, allowing for method chaining and
    /// explicit logging when needed.
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidCredentials => tracing::debug!("Invalid credentials"),
            Self::Unauthenticated => tracing::debug!("Authentication required"),
            Self::Unauthorized => tracing::warn!("Admin access required"),
            Self::Validation(msgs) => tracing::debug!("Validation failed: {}", msgs.join("; ")),
            Self::CodeRejected(msg) => tracing::debug!("Code rejected: {}", msg),
            Self::DuplicateEmail(email) => {
                tracing::debug!("Duplicate email: {}", email)
            }
            Self::InvalidState(msg) => tracing::debug!("Invalid state: {}", msg),
            Self::ResourceNotFound {
                resource_type,
                resource_id,
            } => tracing::debug!("Resource not found: {} {}", resource_type, resource_id),
            Self::Database(msg) => tracing::error!("Database error: {}", msg),
            Self::Provider(msg) => tracing::error!("Provider error: {}", msg),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<IdentityError> for CoordinationError {
    fn from(err: IdentityError) -> Self {
        let error = match err {
            IdentityError::Unauthenticated => Self::Unauthenticated,
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::CodeRejected(msg) => Self::CodeRejected(msg),
            other => Self::Provider(other.to_string()),
        };
        tracing::error!("{}", error);
        error
    }
}

impl From<ProfileError> for CoordinationError {
    fn from(err: ProfileError) -> Self {
        let error = Self::Database(err.to_string());
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = match err {
            SessionError::InvalidSession | SessionError::ProfileMissing => Self::Unauthenticated,
            other => Self::SessionError(other),
        };
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}
