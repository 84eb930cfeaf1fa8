use std::sync::LazyLock;

// "__Host-" prefix makes the cookie host-only.
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-IdbSession".to_string())
});

pub(crate) static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600) // Default to 1 hour if not set or invalid
});

/// TTL for the cached user view. The cache is a shortcut, not a source
/// of truth.
pub(crate) static SESSION_CACHE_TTL: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("SESSION_CACHE_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
});
