use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The token was missing, expired, revoked, or the provider refused it.
    #[error("Invalid or expired session")]
    InvalidSession,

    /// The token maps to a provider user with no profile row yet.
    #[error("No profile for session user")]
    ProfileMissing,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Header error: {0}")]
    HeaderError(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}
