//! idp_broker - Delegated-identity authentication broker
//!
//! This crate coordinates credential sign-in, TOTP second-factor flows
//! and admin user management against an external identity provider,
//! keeping an application-owned profile table alongside the provider's
//! accounts.

mod config;
mod coordination;
mod identity;
mod profile;
mod session;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

// Re-export the main coordination components
pub use coordination::{
    CoordinationError, CreateUserRequest, EnrollmentStarted, LoginStart, LoginSuccess,
    MfaChallengePending, UpdateUserRequest, cancel_login, cancel_totp_enrollment,
    confirm_totp_enrollment, create_user_admin, delete_user_admin, disable_totp,
    handle_auth_callback, is_totp_code_shape, list_users_admin, request_password_reset,
    start_login, start_totp_enrollment, update_password, update_user_admin, verify_login_mfa,
};

// Re-export the route prefix
pub use config::IDB_ROUTE_PREFIX;

pub use identity::{FactorStatus, FactorType, IdentityError, MfaFactor};

pub use profile::{Profile, ProfileError, ProfileStore, Role};

pub use session::{
    AuthenticatedUser, SESSION_COOKIE_NAME, SessionError, get_session_token_from_headers,
    get_user_from_session, get_verified_user, invalidate_session_cache, prepare_logout_response,
};

/// Initialize the broker: connect the stores and create the profile
/// table if needed. Call once at process start.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    storage::init().await?;
    profile::ProfileStore::init().await?;
    Ok(())
}
