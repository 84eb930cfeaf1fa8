//! A minimal in-process identity provider speaking the subset of the
//! REST API the broker uses. State is mutable from tests to stage
//! accounts, factors and failure modes, and counts calls so tests can
//! assert that a flow never reached the provider.

use std::sync::{Arc, Mutex};

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::{Value, json};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MockFactor {
    pub id: String,
    pub status: &'static str, // "verified" | "unverified"
}

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub metadata: Value,
    pub factors: Vec<MockFactor>,
}

#[derive(Debug, Default)]
pub struct MockIdpState {
    pub users: Vec<MockUser>,
    pub fail_admin_delete: bool,
    // Call counters for "the provider was never reached" assertions
    pub token_calls: usize,
    pub invite_calls: usize,
    pub admin_delete_calls: usize,
    pub challenge_calls: usize,
    pub verify_calls: usize,
    next_factor: usize,
    next_challenge: usize,
    next_invited: usize,
}

pub type SharedState = Arc<Mutex<MockIdpState>>;

/// The code the mock accepts for every challenge.
pub const VALID_CODE: &str = "123456";

pub fn new_state() -> SharedState {
    Arc::new(Mutex::new(MockIdpState::default()))
}

/// Reset staged accounts, failure flags and counters between tests.
pub fn reset(state: &SharedState) {
    let mut s = state.lock().unwrap();
    *s = MockIdpState::default();
}

pub fn add_user(state: &SharedState, id: &str, email: &str, password: &str) {
    let mut s = state.lock().unwrap();
    s.users.push(MockUser {
        id: id.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        metadata: json!({}),
        factors: Vec::new(),
    });
}

pub fn add_factor(state: &SharedState, user_id: &str, factor_id: &str, status: &'static str) {
    let mut s = state.lock().unwrap();
    let user = s
        .users
        .iter_mut()
        .find(|u| u.id == user_id)
        .expect("staged user exists");
    user.factors.push(MockFactor {
        id: factor_id.to_string(),
        status,
    });
}

pub fn add_verified_factor(state: &SharedState, user_id: &str, factor_id: &str) {
    add_factor(state, user_id, factor_id, "verified");
}

pub fn factor_count(state: &SharedState, user_id: &str) -> usize {
    state
        .lock()
        .unwrap()
        .users
        .iter()
        .find(|u| u.id == user_id)
        .map(|u| u.factors.len())
        .unwrap_or(0)
}

pub fn user_exists(state: &SharedState, user_id: &str) -> bool {
    state.lock().unwrap().users.iter().any(|u| u.id == user_id)
}

pub fn factor_status(state: &SharedState, user_id: &str, factor_id: &str) -> Option<&'static str> {
    state
        .lock()
        .unwrap()
        .users
        .iter()
        .find(|u| u.id == user_id)
        .and_then(|u| u.factors.iter().find(|f| f.id == factor_id))
        .map(|f| f.status)
}

pub fn token_for(user_id: &str) -> String {
    format!("tok-{user_id}")
}

fn bearer_user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|t| t.strip_prefix("tok-"))
        .map(|id| id.to_string())
}

fn error_body(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "msg": msg }))).into_response()
}

fn token_response(user: &MockUser) -> Value {
    json!({
        "access_token": token_for(&user.id),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": format!("refresh-{}", user.id),
        "user": {
            "id": user.id,
            "email": user.email,
            "user_metadata": user.metadata,
        }
    })
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/token", post(token))
        .route("/user", get(get_user).put(update_user))
        .route("/logout", post(logout))
        .route("/recover", post(recover))
        .route("/factors", get(list_factors).post(enroll_factor))
        .route("/factors/{factor_id}/challenge", post(create_challenge))
        .route("/factors/{factor_id}/verify", post(verify_challenge))
        .route("/factors/{factor_id}", delete(unenroll_factor))
        .route("/admin/users/invite", post(admin_invite))
        .route("/admin/users/{user_id}", delete(admin_delete))
        .with_state(state)
}

async fn token(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.token_calls += 1;

    match params.get("grant_type").map(String::as_str) {
        Some("password") => {
            let email = body.get("email").and_then(Value::as_str).unwrap_or("");
            let password = body.get("password").and_then(Value::as_str).unwrap_or("");
            match s
                .users
                .iter()
                .find(|u| u.email == email && u.password == password)
            {
                Some(user) => Json(token_response(user)).into_response(),
                None => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error_description": "Invalid login credentials" })),
                )
                    .into_response(),
            }
        }
        Some("authorization_code") => {
            let code = body.get("auth_code").and_then(Value::as_str).unwrap_or("");
            // Codes are staged as "code-<user_id>"
            match code
                .strip_prefix("code-")
                .and_then(|id| s.users.iter().find(|u| u.id == id))
            {
                Some(user) => Json(token_response(user)).into_response(),
                None => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error_description": "Invalid authorization code" })),
                )
                    .into_response(),
            }
        }
        _ => error_body(StatusCode::BAD_REQUEST, "unsupported grant type"),
    }
}

async fn get_user(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let s = state.lock().unwrap();
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    match s.users.iter().find(|u| u.id == user_id) {
        Some(user) => Json(json!({
            "id": user.id,
            "email": user.email,
            "user_metadata": user.metadata,
        }))
        .into_response(),
        None => error_body(StatusCode::UNAUTHORIZED, "invalid token"),
    }
}

async fn update_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    match s.users.iter_mut().find(|u| u.id == user_id) {
        Some(user) => {
            if let Some(password) = body.get("password").and_then(Value::as_str) {
                user.password = password.to_string();
            }
            Json(json!({ "id": user.id, "email": user.email })).into_response()
        }
        None => error_body(StatusCode::UNAUTHORIZED, "invalid token"),
    }
}

async fn logout(headers: HeaderMap) -> Response {
    if bearer_user_id(&headers).is_none() {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn recover(Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str).unwrap_or("").is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "email is required");
    }
    Json(json!({})).into_response()
}

async fn list_factors(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let s = state.lock().unwrap();
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    match s.users.iter().find(|u| u.id == user_id) {
        Some(user) => {
            let factors: Vec<Value> = user
                .factors
                .iter()
                .map(|f| {
                    json!({
                        "id": f.id,
                        "factor_type": "totp",
                        "status": f.status,
                        "friendly_name": "Authenticator app",
                    })
                })
                .collect();
            Json(Value::Array(factors)).into_response()
        }
        None => error_body(StatusCode::UNAUTHORIZED, "invalid token"),
    }
}

async fn enroll_factor(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    s.next_factor += 1;
    let factor_id = format!("factor-{}", s.next_factor);
    let Some(user) = s.users.iter_mut().find(|u| u.id == user_id) else {
        return error_body(StatusCode::UNAUTHORIZED, "invalid token");
    };
    user.factors.push(MockFactor {
        id: factor_id.clone(),
        status: "unverified",
    });
    let uri = format!(
        "otpauth://totp/MockIdp:{}?secret=JBSWY3DPEHPK3PXP&issuer=MockIdp",
        user.email
    );
    Json(json!({
        "id": factor_id,
        "type": "totp",
        "totp": { "secret": "JBSWY3DPEHPK3PXP", "uri": uri }
    }))
    .into_response()
}

async fn create_challenge(
    State(state): State<SharedState>,
    Path(factor_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    s.challenge_calls += 1;
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    let factor_exists = s
        .users
        .iter()
        .find(|u| u.id == user_id)
        .map(|u| u.factors.iter().any(|f| f.id == factor_id))
        .unwrap_or(false);
    if !factor_exists {
        return error_body(StatusCode::NOT_FOUND, "factor not found");
    }
    s.next_challenge += 1;
    Json(json!({ "id": format!("challenge-{}", s.next_challenge) })).into_response()
}

async fn verify_challenge(
    State(state): State<SharedState>,
    Path(factor_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.verify_calls += 1;
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    let code = body.get("code").and_then(Value::as_str).unwrap_or("");
    if code != VALID_CODE {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "Invalid TOTP code" })),
        )
            .into_response();
    }
    let Some(user) = s.users.iter_mut().find(|u| u.id == user_id) else {
        return error_body(StatusCode::UNAUTHORIZED, "invalid token");
    };
    let Some(factor) = user.factors.iter_mut().find(|f| f.id == factor_id) else {
        return error_body(StatusCode::NOT_FOUND, "factor not found");
    };
    factor.status = "verified";
    let response = token_response(s.users.iter().find(|u| u.id == user_id).unwrap());
    Json(response).into_response()
}

async fn unenroll_factor(
    State(state): State<SharedState>,
    Path(factor_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    let Some(user_id) = bearer_user_id(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "missing bearer token");
    };
    let Some(user) = s.users.iter_mut().find(|u| u.id == user_id) else {
        return error_body(StatusCode::UNAUTHORIZED, "invalid token");
    };
    let before = user.factors.len();
    user.factors.retain(|f| f.id != factor_id);
    if user.factors.len() == before {
        return error_body(StatusCode::NOT_FOUND, "factor not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

fn has_service_key(headers: &HeaderMap) -> bool {
    headers
        .get("apikey")
        .and_then(|h| h.to_str().ok())
        .map(|k| k == "test-service-role-key")
        .unwrap_or(false)
}

async fn admin_invite(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.invite_calls += 1;
    if !has_service_key(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, "service key required");
    }
    let email = body.get("email").and_then(Value::as_str).unwrap_or("");
    if email.is_empty() {
        return error_body(StatusCode::UNPROCESSABLE_ENTITY, "email is required");
    }
    if s.users.iter().any(|u| u.email == email) {
        return error_body(StatusCode::UNPROCESSABLE_ENTITY, "email already registered");
    }
    s.next_invited += 1;
    let id = format!("invited-{}", s.next_invited);
    let metadata = body.get("data").cloned().unwrap_or_else(|| json!({}));
    s.users.push(MockUser {
        id: id.clone(),
        email: email.to_string(),
        password: String::new(),
        metadata,
        factors: Vec::new(),
    });
    Json(json!({ "id": id, "email": email })).into_response()
}

async fn admin_delete(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    s.admin_delete_calls += 1;
    if !has_service_key(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, "service key required");
    }
    if s.fail_admin_delete {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "simulated provider outage");
    }
    let before = s.users.len();
    s.users.retain(|u| u.id != user_id);
    if s.users.len() == before {
        return error_body(StatusCode::NOT_FOUND, "user not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
