use chrono::Duration;
use http::header::{COOKIE, HeaderMap};
use sha2::{Digest, Sha256};

use crate::identity::{self, SessionTokens};
use crate::profile::ProfileStore;
use crate::session::config::{SESSION_CACHE_TTL, SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::session::types::AuthenticatedUser;
use crate::storage::GENERIC_CACHE_STORE;
use crate::utils::header_set_cookie;

const SESSION_USER_PREFIX: &str = "session_user";

/// Cache entries are keyed by a digest of the token so the opaque token
/// itself never lands in the cache store.
fn session_cache_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Set the session cookie from a freshly issued provider session.
pub(crate) fn create_session_response(tokens: &SessionTokens) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.to_string(),
        tokens.access_token.clone(),
        *SESSION_COOKIE_MAX_AGE as i64,
    )
    .map_err(|e| SessionError::Cookie(e.to_string()))?;

    tracing::debug!("Session cookie issued");
    Ok(headers)
}

/// Prepare a logout response: expire the cookie, drop the cached view and
/// revoke the token on the provider side (best effort).
pub async fn prepare_logout_response(
    session_token: Option<&str>,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.to_string(),
        "value".to_string(),
        -(Duration::days(1).num_seconds()),
    )
    .map_err(|e| SessionError::Cookie(e.to_string()))?;

    if let Some(token) = session_token {
        invalidate_session_cache(token).await?;
        if let Err(e) = identity::sign_out(token).await {
            tracing::debug!("Provider sign-out failed (ignored): {}", e);
        }
    }
    Ok(headers)
}

/// Extract the session token from the request's cookie header.
pub fn get_session_token_from_headers(
    headers: &HeaderMap,
) -> Result<Option<&str>, SessionError> {
    let Some(cookie_header) = headers.get(COOKIE) else {
        tracing::debug!("No cookie header found");
        return Ok(None);
    };

    let cookie_str = cookie_header.to_str().map_err(|e| {
        tracing::error!("Invalid cookie header: {}", e);
        SessionError::HeaderError("Invalid cookie header".to_string())
    })?;

    let cookie_name = SESSION_COOKIE_NAME.as_str();

    let token = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name => Some(v),
            _ => None,
        }
    });

    if token.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
    }

    Ok(token)
}

/// Retrieve the user for a session token, serving from the short-TTL
/// cache when possible.
pub async fn get_user_from_session(
    session_token: &str,
) -> Result<AuthenticatedUser, SessionError> {
    let key = session_cache_key(session_token);

    let cached = GENERIC_CACHE_STORE
        .lock()
        .await
        .get(SESSION_USER_PREFIX, &key)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?;

    if let Some(data) = cached {
        match AuthenticatedUser::try_from(data) {
            Ok(user) => return Ok(user),
            Err(e) => {
                // Corrupt entry: drop it and fall through to a verified fetch
                tracing::warn!("Discarding unreadable session cache entry: {}", e);
                let _ = GENERIC_CACHE_STORE
                    .lock()
                    .await
                    .remove(SESSION_USER_PREFIX, &key)
                    .await;
            }
        }
    }

    get_verified_user(session_token).await
}

/// Retrieve the user for a session token, always reconciling against the
/// provider. Privileged callers use this to bypass the cache.
pub async fn get_verified_user(session_token: &str) -> Result<AuthenticatedUser, SessionError> {
    let claims = identity::get_user(session_token).await.map_err(|e| {
        tracing::debug!("Session token rejected by provider: {}", e);
        SessionError::InvalidSession
    })?;

    let profile = ProfileStore::get_profile(&claims.id)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?
        .ok_or(SessionError::ProfileMissing)?;

    let user = AuthenticatedUser::assemble(&claims, &profile);
    cache_authenticated_user(session_token, &user).await?;

    Ok(user)
}

/// Store an assembled view under the hashed token with the short TTL.
pub(crate) async fn cache_authenticated_user(
    session_token: &str,
    user: &AuthenticatedUser,
) -> Result<(), SessionError> {
    let key = session_cache_key(session_token);
    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            SESSION_USER_PREFIX,
            &key,
            user.clone().into(),
            *SESSION_CACHE_TTL as usize,
        )
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))
}

/// Drop the cached view for a token. Called on every auth-state
/// transition (logout, password change, MFA changes).
pub async fn invalidate_session_cache(session_token: &str) -> Result<(), SessionError> {
    let key = session_cache_key(session_token);
    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(SESSION_USER_PREFIX, &key)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))
}
