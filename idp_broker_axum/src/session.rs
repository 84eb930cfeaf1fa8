use axum::{
    Json, RequestPartsExt,
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{TypedHeader, headers};
use chrono::{DateTime, Utc};
use http::{Method, StatusCode, request::Parts};
use serde_json::json;

use super::config::IDB_REDIRECT_ANON;
use idp_broker::{AuthenticatedUser, Role, SESSION_COOKIE_NAME, get_user_from_session};

pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }

    fn into_response_with_method(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", IDB_REDIRECT_ANON.as_str());
            Redirect::temporary(IDB_REDIRECT_ANON.as_str()).into_response()
        } else {
            tracing::debug!("Unauthenticated request rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Authentication required" })),
            )
                .into_response()
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        self.into_response_with_method()
    }
}

/// Authenticated user information, available as an Axum extractor
///
/// When used as an extractor, it reads the session cookie, has the core
/// layer verify it (cache-assisted) and rejects unauthenticated
/// requests: GET requests redirect to the login path, everything else
/// receives a 401 JSON error.
///
/// The raw session token is carried along so handlers can make further
/// provider calls on the user's behalf.
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// Provider user id
    pub id: String,
    /// Email address
    pub email: String,
    /// First name from the profile row
    pub first_name: String,
    /// Last name from the profile row
    pub last_name: String,
    /// Access role
    pub role: Role,
    /// Whether a TOTP factor is enrolled
    pub mfa_enabled: bool,
    /// When the profile row was created
    pub created_at: DateTime<Utc>,
    /// When the profile row was last updated
    pub updated_at: DateTime<Utc>,
    /// The opaque provider session token from the cookie
    pub session_token: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn from_parts(user: AuthenticatedUser, session_token: String) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            mfa_enabled: user.mfa_enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
            session_token,
        }
    }
}

impl<B> FromRequestParts<B> for AuthUser
where
    B: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _: &B) -> Result<Self, Self::Rejection> {
        let method = parts.method.clone();
        let cookies: TypedHeader<headers::Cookie> = parts.extract().await.map_err(|_| {
            tracing::debug!("Failed to extract cookies");
            AuthRedirect::new(method.clone())
        })?;

        // Get session token from cookie
        let session_token = cookies.get(SESSION_COOKIE_NAME.as_str()).ok_or_else(|| {
            tracing::debug!("No session cookie '{}' present", SESSION_COOKIE_NAME.as_str());
            AuthRedirect::new(method.clone())
        })?;

        let user = get_user_from_session(session_token).await.map_err(|e| {
            tracing::debug!("Session rejected: {}", e);
            AuthRedirect::new(method.clone())
        })?;

        Ok(AuthUser::from_parts(user, session_token.to_string()))
    }
}

impl<B> OptionalFromRequestParts<B> for AuthUser
where
    B: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &B,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, Self::Rejection> =
            <AuthUser as FromRequestParts<B>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}
