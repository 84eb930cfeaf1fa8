//! JSON handlers for the authentication flows: login, MFA, logout,
//! password reset/update and the email-callback exchange.

use axum::{
    Json, Router,
    extract::Query,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use idp_broker::{
    LoginStart, cancel_login, cancel_totp_enrollment, confirm_totp_enrollment, disable_totp,
    get_session_token_from_headers, handle_auth_callback, prepare_logout_response,
    request_password_reset, start_login, start_totp_enrollment, update_password,
    verify_login_mfa,
};

use super::config::IDB_REDIRECT_ANON;
use super::error::ApiError;
use super::session::AuthUser;

pub(super) fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/mfa/verify", post(mfa_verify))
        .route("/mfa/cancel", post(mfa_cancel))
        .route("/mfa/enroll", post(mfa_enroll))
        .route("/mfa/confirm", post(mfa_confirm))
        .route("/mfa/unenroll", post(mfa_unenroll))
        .route("/mfa/disable", post(mfa_disable))
        .route("/reset-password", post(reset_password))
        .route("/password", post(password))
        .route("/callback", get(callback))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(Json(payload): Json<LoginRequest>) -> Result<Response, ApiError> {
    match start_login(&payload.email, &payload.password).await? {
        LoginStart::MfaRequired(pending) => Ok(Json(json!({
            "success": true,
            "mfaRequired": true,
            "loginId": pending.login_id,
            "factorId": pending.factor_id,
            "challengeId": pending.challenge_id,
        }))
        .into_response()),
        LoginStart::Completed(success) => Ok((
            success.headers,
            Json(json!({
                "success": true,
                "mfaRequired": false,
                "firstLogin": success.first_login,
            })),
        )
            .into_response()),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MfaVerifyRequest {
    login_id: String,
    code: String,
}

async fn mfa_verify(Json(payload): Json<MfaVerifyRequest>) -> Result<Response, ApiError> {
    let success = verify_login_mfa(&payload.login_id, &payload.code).await?;
    Ok((
        success.headers,
        Json(json!({ "success": true, "firstLogin": success.first_login })),
    )
        .into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MfaCancelRequest {
    login_id: String,
}

async fn mfa_cancel(Json(payload): Json<MfaCancelRequest>) -> Result<Response, ApiError> {
    cancel_login(&payload.login_id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

async fn mfa_enroll(auth_user: AuthUser) -> Result<Response, ApiError> {
    let enrollment = start_totp_enrollment(&auth_user.session_token).await?;
    Ok(Json(json!({
        "success": true,
        "factorId": enrollment.factor_id,
        "secret": enrollment.secret,
        "uri": enrollment.uri,
        "qrSvg": enrollment.qr_svg,
    }))
    .into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MfaConfirmRequest {
    factor_id: String,
    code: String,
}

async fn mfa_confirm(
    auth_user: AuthUser,
    Json(payload): Json<MfaConfirmRequest>,
) -> Result<Response, ApiError> {
    confirm_totp_enrollment(
        &auth_user.session_token,
        &auth_user.id,
        &payload.factor_id,
        &payload.code,
    )
    .await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MfaUnenrollRequest {
    factor_id: String,
}

async fn mfa_unenroll(
    auth_user: AuthUser,
    Json(payload): Json<MfaUnenrollRequest>,
) -> Result<Response, ApiError> {
    cancel_totp_enrollment(&auth_user.session_token, &payload.factor_id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

async fn mfa_disable(auth_user: AuthUser) -> Result<Response, ApiError> {
    disable_totp(&auth_user.session_token, &auth_user.id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

async fn logout(headers: HeaderMap) -> Result<Response, ApiError> {
    let token = get_session_token_from_headers(&headers)
        .map_err(|e| ApiError::from(idp_broker::CoordinationError::from(e)))?;
    let headers = prepare_logout_response(token)
        .await
        .map_err(|e| ApiError::from(idp_broker::CoordinationError::from(e)))?;
    Ok((headers, Json(json!({ "success": true }))).into_response())
}

#[derive(Deserialize)]
struct ResetPasswordRequest {
    email: String,
}

async fn reset_password(Json(payload): Json<ResetPasswordRequest>) -> Result<Response, ApiError> {
    request_password_reset(&payload.email).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Check your email for a password reset link",
    }))
    .into_response())
}

#[derive(Deserialize)]
struct UpdatePasswordRequest {
    password: String,
}

async fn password(
    auth_user: AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Response, ApiError> {
    update_password(&auth_user.session_token, &auth_user.id, &payload.password).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// Exchange an authorization code from an email link for a session, then
/// land on the login page. Errors are forwarded as a query parameter.
async fn callback(Query(params): Query<CallbackParams>) -> Response {
    let login_path = IDB_REDIRECT_ANON.as_str();

    if let Some(error) = params.error {
        return redirect_with_error(login_path, &error);
    }

    let Some(code) = params.code else {
        return redirect_with_error(login_path, "missing authorization code");
    };

    match handle_auth_callback(&code).await {
        Ok(headers) => (headers, Redirect::temporary(login_path)).into_response(),
        Err(e) => redirect_with_error(login_path, &e.to_string()),
    }
}

fn redirect_with_error(login_path: &str, error: &str) -> Response {
    let target = format!("{}?error={}", login_path, urlencoding::encode(error));
    Redirect::temporary(&target).into_response()
}
