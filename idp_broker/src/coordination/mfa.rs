//! TOTP factor enrollment and removal.
//!
//! Secrets are generated, stored and verified by the provider. The
//! broker's part is the cleanup-enroll-confirm sequencing and turning
//! the provisioning URI into something scannable.

use chrono::Utc;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::identity::{self, IdentityError};
use crate::profile::ProfileStore;
use crate::session;

use super::errors::CoordinationError;
use super::validation::is_totp_code_shape;

/// Provisioning material handed to the UI. `qr_svg` is `None` when
/// rendering failed; the raw secret is always present as the manual
/// fallback.
#[derive(Debug)]
pub struct EnrollmentStarted {
    pub factor_id: String,
    pub secret: String,
    pub uri: String,
    pub qr_svg: Option<String>,
}

fn render_qr_svg(uri: &str) -> Option<String> {
    match QrCode::new(uri.as_bytes()) {
        Ok(code) => Some(
            code.render::<svg::Color>()
                .min_dimensions(200, 200)
                .build(),
        ),
        Err(e) => {
            tracing::warn!("Failed to render provisioning QR code: {}", e);
            None
        }
    }
}

/// Begin enrollment: clear any pending (unverified) TOTP factors so no
/// duplicate enrollments accumulate, then request a fresh factor.
pub async fn start_totp_enrollment(
    access_token: &str,
) -> Result<EnrollmentStarted, CoordinationError> {
    let factors = identity::list_factors(access_token).await?;

    for factor in factors.iter().filter(|f| f.is_unverified_totp()) {
        match identity::unenroll_factor(access_token, &factor.id).await {
            Ok(()) => tracing::debug!("Removed stale unverified factor {}", factor.id),
            // Already gone is fine; anything else is not
            Err(IdentityError::NotFound) => {
                tracing::debug!("Stale factor {} already removed", factor.id)
            }
            Err(other) => return Err(other.into()),
        }
    }

    let enrolled = identity::enroll_totp(access_token, Some("Authenticator app")).await?;
    tracing::info!("Enrolled TOTP factor {}", enrolled.id);

    let qr_svg = render_qr_svg(&enrolled.totp.uri);

    Ok(EnrollmentStarted {
        factor_id: enrolled.id,
        secret: enrolled.totp.secret,
        uri: enrolled.totp.uri,
        qr_svg,
    })
}

/// Confirm enrollment with a code from the authenticator app. Success
/// marks the factor verified on the provider and sets the profile flag;
/// failure leaves the factor unverified and is retryable.
pub async fn confirm_totp_enrollment(
    access_token: &str,
    user_id: &str,
    factor_id: &str,
    code: &str,
) -> Result<(), CoordinationError> {
    if !is_totp_code_shape(code) {
        return Err(CoordinationError::Validation(vec![
            "verification code must be exactly six digits".to_string(),
        ])
        .log());
    }

    let challenge = identity::create_challenge(access_token, factor_id).await?;

    match identity::verify_challenge(access_token, factor_id, &challenge.id, code).await {
        Ok(_) => {}
        Err(IdentityError::CodeRejected(msg)) => {
            tracing::debug!("Enrollment code rejected for factor {}: {}", factor_id, msg);
            return Err(CoordinationError::CodeRejected(msg));
        }
        Err(other) => return Err(other.into()),
    }

    let profile =
        ProfileStore::get_profile(user_id)
            .await?
            .ok_or_else(|| CoordinationError::ResourceNotFound {
                resource_type: "User".to_string(),
                resource_id: user_id.to_string(),
            })?;

    let mut profile = profile;
    profile.mfa_enabled = true;
    profile.updated_at = Utc::now();
    ProfileStore::upsert_profile(profile).await?;

    // The cached view is now stale
    session::invalidate_session_cache(access_token).await?;

    tracing::info!("TOTP factor {} verified for user {}", factor_id, user_id);
    Ok(())
}

/// Abandon a pending enrollment, removing the unverified factor so no
/// orphaned enrollment state remains.
pub async fn cancel_totp_enrollment(
    access_token: &str,
    factor_id: &str,
) -> Result<(), CoordinationError> {
    match identity::unenroll_factor(access_token, factor_id).await {
        Ok(()) => {}
        Err(IdentityError::NotFound) => {
            tracing::debug!("Factor {} already removed during cancellation", factor_id)
        }
        Err(other) => return Err(other.into()),
    }
    tracing::debug!("Cancelled enrollment of factor {}", factor_id);
    Ok(())
}

/// Remove every TOTP factor and clear the profile flag.
pub async fn disable_totp(access_token: &str, user_id: &str) -> Result<(), CoordinationError> {
    let factors = identity::list_factors(access_token).await?;

    for factor in factors
        .iter()
        .filter(|f| f.is_verified_totp() || f.is_unverified_totp())
    {
        match identity::unenroll_factor(access_token, &factor.id).await {
            Ok(()) => tracing::debug!("Unenrolled factor {}", factor.id),
            Err(IdentityError::NotFound) => {}
            Err(other) => return Err(other.into()),
        }
    }

    if let Some(profile) = ProfileStore::get_profile(user_id).await? {
        let mut profile = profile;
        profile.mfa_enabled = false;
        profile.updated_at = Utc::now();
        ProfileStore::upsert_profile(profile).await?;
    }

    session::invalidate_session_cache(access_token).await?;

    tracing::info!("TOTP disabled for user {}", user_id);
    Ok(())
}
