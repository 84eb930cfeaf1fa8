//! Central configuration for the idp_broker_axum crate

use std::sync::LazyLock;

/// Path anonymous (or rejected) requests are redirected to.
/// Default: "/login"
pub static IDB_REDIRECT_ANON: LazyLock<String> =
    LazyLock::new(|| std::env::var("IDB_REDIRECT_ANON").unwrap_or_else(|_| "/login".to_string()));

/// Default landing path for authenticated users.
/// Default: "/"
pub static IDB_REDIRECT_USER: LazyLock<String> =
    LazyLock::new(|| std::env::var("IDB_REDIRECT_USER").unwrap_or_else(|_| "/".to_string()));

/// Page-path prefix that requires the admin role.
/// Default: "/admin"
pub static IDB_ADMIN_PATH_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("IDB_ADMIN_PATH_PREFIX").unwrap_or_else(|_| "/admin".to_string())
});

/// Comma-separated page paths that always pass the route guard, so a
/// user holding only a recovery link can reach them.
/// Default: "/password-reset,/password-update"
pub static IDB_PASSWORD_RESET_PATHS: LazyLock<Vec<String>> = LazyLock::new(|| {
    std::env::var("IDB_PASSWORD_RESET_PATHS")
        .unwrap_or_else(|_| "/password-reset,/password-update".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
});
