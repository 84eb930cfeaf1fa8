mod server;

use axum::{Json, Router, middleware, routing::get};
use serde_json::json;

use idp_broker_axum::{AuthUser, IDB_ROUTE_PREFIX, idp_broker_router, page_route_guard};

async fn index(user: AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Hello, {} {}!", user.first_name, user.last_name),
        "email": user.email,
        "mfaEnabled": user.mfa_enabled,
    }))
}

async fn admin_home(user: AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Admin console for {}", user.email),
    }))
}

async fn login_page() -> Json<serde_json::Value> {
    Json(json!({
        "message": "POST credentials to the login endpoint",
        "endpoint": format!("{}/auth/login", IDB_ROUTE_PREFIX.as_str()),
    }))
}

async fn password_update_page() -> Json<serde_json::Value> {
    Json(json!({
        "message": "POST the new password to the password endpoint",
        "endpoint": format!("{}/auth/password", IDB_ROUTE_PREFIX.as_str()),
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    server::init_tracing("demo_server");

    idp_broker_axum::init().await?;

    let pages = Router::new()
        .route("/", get(index))
        .route("/admin", get(admin_home))
        .route("/login", get(login_page))
        .route("/password-update", get(password_update_page))
        .layer(middleware::from_fn(page_route_guard));

    let app = Router::new()
        .merge(pages)
        .nest(IDB_ROUTE_PREFIX.as_str(), idp_broker_router());

    let handle = server::spawn_http_server(3000, app);
    handle.await?;

    Ok(())
}
