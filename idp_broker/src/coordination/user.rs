//! Self-service account operations: password reset, password update and
//! the email-callback code exchange.

use http::header::HeaderMap;

use crate::identity;
use crate::profile::ProfileStore;
use crate::session;

use super::errors::CoordinationError;
use super::login::update_last_login;
use super::validation::{is_valid_email, normalize_email};

const MIN_PASSWORD_LEN: usize = 8;

/// Ask the provider to email a reset link. Callers respond with the same
/// generic message whether or not the address exists.
pub async fn request_password_reset(email: &str) -> Result<(), CoordinationError> {
    let email = normalize_email(email);
    if email.is_empty() || !is_valid_email(&email) {
        return Err(CoordinationError::Validation(vec![
            "email must be a valid email address".to_string(),
        ])
        .log());
    }

    identity::send_reset_password_email(&email).await?;
    tracing::info!("Password reset email requested for {}", email);
    Ok(())
}

/// Set a new password for the session's user. Used by the forced
/// first-login step, after which the row no longer reads as first-login.
pub async fn update_password(
    access_token: &str,
    user_id: &str,
    new_password: &str,
) -> Result<(), CoordinationError> {
    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(CoordinationError::Validation(vec![format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )])
        .log());
    }

    identity::update_password(access_token, new_password).await?;

    if let Some(profile) = ProfileStore::get_profile(user_id).await? {
        update_last_login(profile).await?;
    }

    // Credentials changed; the cached view must not outlive them
    session::invalidate_session_cache(access_token).await?;

    tracing::info!("Password updated for user {}", user_id);
    Ok(())
}

/// Exchange an authorization code from an email link (invite, recovery)
/// for a session cookie.
pub async fn handle_auth_callback(code: &str) -> Result<HeaderMap, CoordinationError> {
    if code.trim().is_empty() {
        return Err(CoordinationError::Validation(vec![
            "code is required".to_string(),
        ])
        .log());
    }

    let tokens = identity::exchange_code_for_session(code.trim()).await?;
    let headers = session::create_session_response(&tokens)?;
    tracing::debug!("Auth callback code exchanged for a session");
    Ok(headers)
}
