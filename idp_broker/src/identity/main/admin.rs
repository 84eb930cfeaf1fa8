use serde_json::json;

use crate::identity::config::{IDP_SERVICE_ROLE_KEY, endpoint, get_client};
use crate::identity::errors::IdentityError;
use crate::identity::types::InvitedUser;

/// Invite a user by email through the provider's privileged admin API.
/// Profile fields travel as metadata so the provider's invite email can
/// reference them and the callback flow can recover them.
pub(crate) async fn invite_user_by_email(
    email: &str,
    metadata: serde_json::Value,
) -> Result<InvitedUser, IdentityError> {
    let client = get_client();
    let response = client
        .post(endpoint("/admin/users/invite"))
        .header("apikey", IDP_SERVICE_ROLE_KEY.as_str())
        .bearer_auth(IDP_SERVICE_ROLE_KEY.as_str())
        .json(&json!({ "email": email, "data": metadata }))
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK | reqwest::StatusCode::CREATED => {}
        status if status.is_client_error() => {
            return Err(IdentityError::Provider(
                super::utils::read_error_message(response).await,
            ));
        }
        status => return Err(IdentityError::Unexpected(status.as_u16())),
    }

    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::Serde(format!("Failed to deserialize invite response: {e}")))
}

/// Delete a provider account through the privileged admin API.
pub(crate) async fn delete_user(user_id: &str) -> Result<(), IdentityError> {
    let client = get_client();
    let response = client
        .delete(endpoint(&format!("/admin/users/{user_id}")))
        .header("apikey", IDP_SERVICE_ROLE_KEY.as_str())
        .bearer_auth(IDP_SERVICE_ROLE_KEY.as_str())
        .send()
        .await
        .map_err(|e| IdentityError::Request(e.to_string()))?;

    match response.status() {
        status if status.is_success() => Ok(()),
        reqwest::StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
        status if status.is_client_error() => Err(IdentityError::Provider(
            super::utils::read_error_message(response).await,
        )),
        status => Err(IdentityError::Unexpected(status.as_u16())),
    }
}
