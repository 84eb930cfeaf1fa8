//! Session handling for provider-issued opaque tokens.
//!
//! The broker never parses or verifies the token itself; it forwards the
//! cookie value to the provider's `/user` endpoint and caches the
//! assembled view-model for a short TTL.

mod config;
mod errors;
mod main;
mod types;

pub use config::SESSION_COOKIE_NAME;
pub use errors::SessionError;
pub use types::AuthenticatedUser;

pub use main::{
    get_session_token_from_headers, get_user_from_session, get_verified_user,
    invalidate_session_cache, prepare_logout_response,
};

pub(crate) use main::{cache_authenticated_user, create_session_response};
