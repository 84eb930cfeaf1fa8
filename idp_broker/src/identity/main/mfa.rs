use serde_json::json;

use crate::identity::config::{IDP_ANON_KEY, endpoint, get_client};
use crate::identity::errors::IdentityError;
use crate::identity::types::{ChallengeCreated, EnrolledFactor, MfaFactor, SessionTokens};

use super::utils::read_error_message;

/// List the second-factor methods enrolled for the token's user.
pub(crate) async fn list_factors(access_token: &str) -> Result<Vec<MfaFactor>, IdentityError> {
    let client = get_client();
    let response = client
        .get(endpoint("/factors"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => {}
        reqwest::StatusCode::UNAUTHORIZED => return Err(IdentityError::Unauthenticated),
        status if status.is_client_error() => {
            return Err(IdentityError::Provider(read_error_message(response).await));
        }
        status => return Err(IdentityError::Unexpected(status.as_u16())),
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize factor list: {e}")))
}

/// Enroll a new TOTP factor. The provider generates the secret and the
/// provisioning URI; the broker only relays them.
pub(crate) async fn enroll_totp(
    access_token: &str,
    friendly_name: Option<&str>,
) -> Result<EnrolledFactor, IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint("/factors"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .json(&json!({ "factor_type": "totp", "friendly_name": friendly_name }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK | reqwest::StatusCode::CREATED => {}
        reqwest::StatusCode::UNAUTHORIZED => return Err(IdentityError::Unauthenticated),
        status if status.is_client_error() => {
            return Err(IdentityError::Provider(read_error_message(response).await));
        }
        status => return Err(IdentityError::Unexpected(status.as_u16())),
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize enroll response: {e}")))
}

/// Issue a challenge binding the next verification attempt to a factor.
pub(crate) async fn create_challenge(
    access_token: &str,
    factor_id: &str,
) -> Result<ChallengeCreated, IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint(&format!("/factors/{factor_id}/challenge")))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK | reqwest::StatusCode::CREATED => {}
        reqwest::StatusCode::UNAUTHORIZED => return Err(IdentityError::Unauthenticated),
        reqwest::StatusCode::NOT_FOUND => return Err(IdentityError::NotFound),
        status if status.is_client_error() => {
            return Err(IdentityError::Provider(read_error_message(response).await));
        }
        status => return Err(IdentityError::Unexpected(status.as_u16())),
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize challenge: {e}")))
}

/// Submit a code for a challenge. The provider performs the actual TOTP
/// comparison; a wrong code comes back as `CodeRejected` and the caller
/// may retry against the same challenge.
pub(crate) async fn verify_challenge(
    access_token: &str,
    factor_id: &str,
    challenge_id: &str,
    code: &str,
) -> Result<SessionTokens, IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint(&format!("/factors/{factor_id}/verify")))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .json(&json!({ "challenge_id": challenge_id, "code": code }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => {}
        reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
            let msg = read_error_message(response).await;
            tracing::debug!("Challenge verification rejected: {}", msg);
            return Err(IdentityError::CodeRejected(msg));
        }
        reqwest::StatusCode::UNAUTHORIZED => return Err(IdentityError::Unauthenticated),
        reqwest::StatusCode::NOT_FOUND => return Err(IdentityError::NotFound),
        status => return Err(IdentityError::Unexpected(status.as_u16())),
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize verify response: {e}")))
}

/// Remove a factor. A 404 maps to `NotFound` so enrollment cleanup can
/// tolerate factors that disappeared underneath it.
pub(crate) async fn unenroll_factor(
    access_token: &str,
    factor_id: &str,
) -> Result<(), IdentityError> {
    let client = get_client();
    let response = client
        .delete(endpoint(&format!("/factors/{factor_id}")))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        status if status.is_success() => Ok(()),
        reqwest::StatusCode::UNAUTHORIZED => Err(IdentityError::Unauthenticated),
        reqwest::StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
        status if status.is_client_error() => {
            Err(IdentityError::Provider(read_error_message(response).await))
        }
        status => Err(IdentityError::Unexpected(status.as_u16())),
    }
}
