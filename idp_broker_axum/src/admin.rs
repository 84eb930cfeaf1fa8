//! Admin user-management JSON API.
//!
//! Every handler re-verifies the caller against the provider (bypassing
//! the session cache) before the role check, so a stale cached view can
//! never authorize a privileged action.

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use idp_broker::{
    AuthenticatedUser, CreateUserRequest, UpdateUserRequest, create_user_admin, delete_user_admin,
    get_verified_user, list_users_admin, update_user_admin,
};

use super::error::ApiError;
use super::session::AuthUser;

pub(super) fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", axum::routing::patch(update_user).delete(delete_user))
}

/// Reconcile the caller against a provider-verified fetch. The admin
/// role itself is enforced by the coordination layer.
async fn verified_caller(auth_user: &AuthUser) -> Result<AuthenticatedUser, ApiError> {
    get_verified_user(&auth_user.session_token)
        .await
        .map_err(|e| {
            tracing::debug!("Privileged re-verification failed: {}", e);
            ApiError::unauthenticated()
        })
}

async fn list_users(auth_user: AuthUser) -> Result<Response, ApiError> {
    let caller = verified_caller(&auth_user).await?;
    let users = list_users_admin(&caller).await?;
    Ok(Json(json!({ "success": true, "users": users })).into_response())
}

async fn create_user(
    auth_user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let caller = verified_caller(&auth_user).await?;
    let user = create_user_admin(&caller, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": user })),
    )
        .into_response())
}

async fn update_user(
    auth_user: AuthUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Response, ApiError> {
    let caller = verified_caller(&auth_user).await?;
    let user = update_user_admin(&caller, &user_id, payload).await?;
    Ok(Json(json!({ "success": true, "user": user })).into_response())
}

async fn delete_user(
    auth_user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let caller = verified_caller(&auth_user).await?;
    delete_user_admin(&caller, &user_id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}
