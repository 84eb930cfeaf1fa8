use serde_json::json;

use crate::identity::config::{IDP_ANON_KEY, ORIGIN, endpoint, get_client};
use crate::identity::errors::IdentityError;
use crate::identity::types::{IdentityUser, SessionTokens};

use super::utils::read_error_message;

/// Exchange an email/password pair for a provider session.
///
/// Every rejection collapses into `InvalidCredentials` so callers cannot
/// leak which field was wrong.
pub(crate) async fn sign_in_with_password(
    email: &str,
    password: &str,
) -> Result<SessionTokens, IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint("/token?grant_type=password"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => {}
        reqwest::StatusCode::BAD_REQUEST
        | reqwest::StatusCode::UNAUTHORIZED
        | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
            let msg = read_error_message(response).await;
            tracing::debug!("Password sign-in rejected: {}", msg);
            return Err(IdentityError::InvalidCredentials);
        }
        status => return Err(IdentityError::Unexpected(status.as_u16())),
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize token response: {e}")))
}

/// Fetch the user bound to an access token. This is the server-verified
/// lookup the session layer reconciles its cache against.
pub(crate) async fn get_user(access_token: &str) -> Result<IdentityUser, IdentityError> {
    let client = get_client();
    let response = client
        .get(endpoint("/user"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => {}
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
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize user response: {e}")))
}

/// Revoke the token on the provider side.
pub(crate) async fn sign_out(access_token: &str) -> Result<(), IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint("/logout"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        status if status.is_success() => Ok(()),
        reqwest::StatusCode::UNAUTHORIZED => Err(IdentityError::Unauthenticated),
        status if status.is_client_error() => {
            Err(IdentityError::Provider(read_error_message(response).await))
        }
        status => Err(IdentityError::Unexpected(status.as_u16())),
    }
}

/// Set a new password for the user bound to the access token.
pub(crate) async fn update_password(
    access_token: &str,
    new_password: &str,
) -> Result<(), IdentityError> {
    let client = get_client();
    let response = client
        .put(endpoint("/user"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .bearer_auth(access_token)
        .json(&json!({ "password": new_password }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        status if status.is_success() => Ok(()),
        reqwest::StatusCode::UNAUTHORIZED => Err(IdentityError::Unauthenticated),
        status if status.is_client_error() => {
            Err(IdentityError::Provider(read_error_message(response).await))
        }
        status => Err(IdentityError::Unexpected(status.as_u16())),
    }
}

/// Ask the provider to send a password-reset email. The redirect link
/// points back into this application's password-update page.
pub(crate) async fn send_reset_password_email(email: &str) -> Result<(), IdentityError> {
    let redirect_to = format!("{}{}", ORIGIN.as_str(), "/password-update");

    let client = get_client();
    let response = client
        .post(endpoint("/recover"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .query(&[("redirect_to", redirect_to.as_str())])
        .json(&json!({ "email": email }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        status if status.is_success() => Ok(()),
        status if status.is_client_error() => {
            Err(IdentityError::Provider(read_error_message(response).await))
        }
        status => Err(IdentityError::Unexpected(status.as_u16())),
    }
}

/// Exchange an authorization code from the email-callback flow for a
/// provider session.
pub(crate) async fn exchange_code_for_session(
    code: &str,
) -> Result<SessionTokens, IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint("/token?grant_type=authorization_code"))
        .header("apikey", IDP_ANON_KEY.as_str())
        .json(&json!({ "auth_code": code }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => {}
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
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize token response: {e}")))
}
