use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::config::{
    IDB_ADMIN_PATH_PREFIX, IDB_PASSWORD_RESET_PATHS, IDB_REDIRECT_ANON, IDB_REDIRECT_USER,
};
use idp_broker::{AuthenticatedUser, get_session_token_from_headers, get_user_from_session};

/// Per-request, stateless page guard. Rules, evaluated in order:
/// (a) password-reset paths always pass;
/// (b) protected paths without a session redirect to the login path;
/// (c) the login path with a session redirects to the landing path;
/// (d) admin paths require the admin role, else redirect to landing;
/// (e) a provider invitation callback is sent to the login path with its
///     query preserved so the client flow can finish the handshake.
pub async fn page_route_guard(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or("").to_string();
    let login_path = IDB_REDIRECT_ANON.as_str();

    if is_password_reset_path(&path) {
        return next.run(req).await;
    }

    if has_invite_marker(&query) && path != login_path {
        let target = format!("{login_path}?{query}");
        tracing::debug!("Rewriting invitation callback to {}", target);
        return Redirect::temporary(&target).into_response();
    }

    let user = resolve_session_user(req.headers()).await;

    match user {
        None => {
            if path == login_path {
                next.run(req).await
            } else {
                tracing::debug!("No session for {}, redirecting to login", path);
                Redirect::temporary(login_path).into_response()
            }
        }
        Some(user) => {
            if path == login_path {
                return Redirect::temporary(IDB_REDIRECT_USER.as_str()).into_response();
            }
            if path.starts_with(IDB_ADMIN_PATH_PREFIX.as_str()) && !user.is_admin() {
                tracing::debug!("User {} lacks admin role for {}", user.id, path);
                return Redirect::temporary(IDB_REDIRECT_USER.as_str()).into_response();
            }
            next.run(req).await
        }
    }
}

async fn resolve_session_user(headers: &HeaderMap) -> Option<AuthenticatedUser> {
    let token = get_session_token_from_headers(headers).ok()??.to_string();
    get_user_from_session(&token).await.ok()
}

fn is_password_reset_path(path: &str) -> bool {
    IDB_PASSWORD_RESET_PATHS.iter().any(|p| p == path)
}

/// The provider appends `type=invite` to its invitation callback. Links
/// carrying the marker in a URL fragment never reach the server, so the
/// query form is the guarded surface.
fn has_invite_marker(query: &str) -> bool {
    query.split('&').any(|pair| pair == "type=invite")
}
