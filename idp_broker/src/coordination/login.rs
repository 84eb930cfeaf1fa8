//! Credential sign-in, conditional MFA verification and profile
//! bootstrap.
//!
//! The flow moves through: credentials submitted -> (MFA required ->
//! challenge verified ->) authenticated -> profile bootstrapped. All
//! cryptographic checks happen on the provider; this module only
//! sequences the calls and holds the in-between state.

use chrono::Utc;
use http::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::identity::{self, SessionTokens};
use crate::profile::{Profile, ProfileStore, Role};
use crate::session::{self, AuthenticatedUser};
use crate::storage::{CacheData, GENERIC_CACHE_STORE};
use crate::utils::gen_random_string;

use super::errors::CoordinationError;
use super::validation::{is_totp_code_shape, is_valid_email, normalize_email};

const PENDING_LOGIN_PREFIX: &str = "mfa_login";

/// Seconds a pending MFA login survives before the user must restart.
const LOGIN_TICKET_TTL: u64 = 300;

/// Outcome of the credential step.
#[derive(Debug)]
pub enum LoginStart {
    /// A verified TOTP factor exists; the caller must collect a code and
    /// call [`verify_login_mfa`] with the returned ticket.
    MfaRequired(MfaChallengePending),
    /// No second factor enrolled; the session is already issued.
    Completed(LoginSuccess),
}

#[derive(Debug)]
pub struct MfaChallengePending {
    pub login_id: String,
    pub factor_id: String,
    pub challenge_id: String,
}

/// A fully authenticated login: session cookie headers, the assembled
/// user view and the first-login marker.
#[derive(Debug)]
pub struct LoginSuccess {
    pub headers: HeaderMap,
    pub user: AuthenticatedUser,
    pub first_login: bool,
}

/// Credential-authenticated state parked while the user types a code.
/// Removed on verification success or cancellation; expires otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingLogin {
    user_id: String,
    email: String,
    access_token: String,
    refresh_token: Option<String>,
    factor_id: String,
    challenge_id: String,
}

impl From<PendingLogin> for CacheData {
    fn from(data: PendingLogin) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize PendingLogin"),
        }
    }
}

impl TryFrom<CacheData> for PendingLogin {
    type Error = CoordinationError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| CoordinationError::Database(e.to_string()))
    }
}

/// Step 1 and 2 of the flow: credential check and MFA discovery.
pub async fn start_login(email: &str, password: &str) -> Result<LoginStart, CoordinationError> {
    let email = normalize_email(email);

    let mut field_errors = Vec::new();
    if email.is_empty() {
        field_errors.push("email is required".to_string());
    } else if !is_valid_email(&email) {
        field_errors.push("email is not a valid email address".to_string());
    }
    if password.is_empty() {
        field_errors.push("password is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(CoordinationError::Validation(field_errors).log());
    }

    let tokens = identity::sign_in_with_password(&email, password)
        .await
        .map_err(|e| match e {
            identity::IdentityError::InvalidCredentials => {
                CoordinationError::InvalidCredentials.log()
            }
            other => other.into(),
        })?;

    tracing::debug!("Credential check passed for {}", email);

    let factors = identity::list_factors(&tokens.access_token).await?;
    let verified_totp = factors.iter().find(|f| f.is_verified_totp());

    let Some(factor) = verified_totp else {
        tracing::debug!("No verified TOTP factor enrolled, proceeding to bootstrap");
        return complete_login(tokens).await.map(LoginStart::Completed);
    };

    let challenge = identity::create_challenge(&tokens.access_token, &factor.id).await?;
    tracing::debug!("Issued MFA challenge {} for factor {}", challenge.id, factor.id);

    let user_id = tokens
        .user
        .as_ref()
        .map(|u| u.id.clone())
        .unwrap_or_default();
    let pending = PendingLogin {
        user_id,
        email,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        factor_id: factor.id.clone(),
        challenge_id: challenge.id.clone(),
    };

    let login_id = gen_random_string(32)?;
    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            PENDING_LOGIN_PREFIX,
            &login_id,
            pending.into(),
            LOGIN_TICKET_TTL as usize,
        )
        .await
        .map_err(|e| CoordinationError::Database(e.to_string()))?;

    Ok(LoginStart::MfaRequired(MfaChallengePending {
        login_id,
        factor_id: factor.id.clone(),
        challenge_id: challenge.id,
    }))
}

/// Step 4 of the flow: submit the 6-digit code. A wrong code keeps the
/// pending state so the user may retry without re-entering the password.
pub async fn verify_login_mfa(
    login_id: &str,
    code: &str,
) -> Result<LoginSuccess, CoordinationError> {
    if !is_totp_code_shape(code) {
        return Err(CoordinationError::Validation(vec![
            "verification code must be exactly six digits".to_string(),
        ])
        .log());
    }

    let cached = GENERIC_CACHE_STORE
        .lock()
        .await
        .get(PENDING_LOGIN_PREFIX, login_id)
        .await
        .map_err(|e| CoordinationError::Database(e.to_string()))?;

    let Some(data) = cached else {
        return Err(
            CoordinationError::InvalidState("login challenge expired or unknown".to_string())
                .log(),
        );
    };
    let pending = PendingLogin::try_from(data)?;

    let upgraded = match identity::verify_challenge(
        &pending.access_token,
        &pending.factor_id,
        &pending.challenge_id,
        code,
    )
    .await
    {
        Ok(tokens) => tokens,
        Err(identity::IdentityError::CodeRejected(msg)) => {
            // Pending state stays in place for the retry
            tracing::debug!("MFA code rejected for login {}: {}", login_id, msg);
            return Err(CoordinationError::CodeRejected(msg));
        }
        Err(other) => return Err(other.into()),
    };

    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(PENDING_LOGIN_PREFIX, login_id)
        .await
        .map_err(|e| CoordinationError::Database(e.to_string()))?;

    tracing::debug!("MFA verification succeeded for login {}", login_id);
    complete_login(upgraded).await
}

/// Drop a pending login. The provider-side challenge simply expires.
pub async fn cancel_login(login_id: &str) -> Result<(), CoordinationError> {
    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(PENDING_LOGIN_PREFIX, login_id)
        .await
        .map_err(|e| CoordinationError::Database(e.to_string()))?;
    tracing::debug!("Cancelled pending login {}", login_id);
    Ok(())
}

/// Step 5: profile bootstrap. Lazily creates the profile row on first
/// successful login, detects first-time logins via the untouched
/// timestamps, and touches last activity otherwise.
pub(super) async fn complete_login(
    tokens: SessionTokens,
) -> Result<LoginSuccess, CoordinationError> {
    let claims = match tokens.user.clone() {
        Some(user) => user,
        None => identity::get_user(&tokens.access_token).await?,
    };

    let profile = match ProfileStore::get_profile(&claims.id).await? {
        Some(profile) => profile,
        None => {
            let email = claims
                .email
                .clone()
                .map(|e| normalize_email(&e))
                .unwrap_or_default();
            let first_name = claims.metadata_str("first_name").unwrap_or("").to_string();
            let last_name = claims.metadata_str("last_name").unwrap_or("").to_string();
            tracing::info!("Bootstrapping profile row for {}", claims.id);
            ProfileStore::upsert_profile(Profile::new(
                claims.id.clone(),
                email,
                first_name,
                last_name,
                Role::User,
            ))
            .await?
        }
    };

    let first_login = profile.is_first_login();

    let profile = if first_login {
        tracing::debug!("First-time login for {}", claims.id);
        profile
    } else {
        update_last_login(profile).await?
    };

    let headers = session::create_session_response(&tokens)?;
    let user = AuthenticatedUser::assemble(&claims, &profile);
    session::cache_authenticated_user(&tokens.access_token, &user).await?;

    Ok(LoginSuccess {
        headers,
        user,
        first_login,
    })
}

/// Touch the last-activity timestamp. After this, the row never reads as
/// first-login again.
pub(crate) async fn update_last_login(profile: Profile) -> Result<Profile, CoordinationError> {
    let touched = Profile {
        updated_at: Utc::now(),
        ..profile
    };
    Ok(ProfileStore::upsert_profile(touched).await?)
}
