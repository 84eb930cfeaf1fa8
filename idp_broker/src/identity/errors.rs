use thiserror::Error;

/// Errors surfaced by the identity provider client.
#[derive(Debug, Error, Clone)]
pub enum IdentityError {
    /// The provider rejected the supplied credentials. Carries no
    /// detail about which field was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The bearer token was missing, expired or revoked.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The provider rejected a verification code for a challenge.
    #[error("Code rejected: {0}")]
    CodeRejected(String),

    /// The addressed resource does not exist on the provider side.
    #[error("Resource not found")]
    NotFound,

    /// Any other 4xx the provider explained in its error body.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transport-level failure talking to the provider.
    #[error("Request error: {0}")]
    Request(String),

    /// Response body did not match the expected shape.
    #[error("Serde error: {0}")]
    Serde(String),

    /// Status code outside the mapped set.
    #[error("Unexpected provider status: {0}")]
    Unexpected(u16),
}
