use std::{
    env,
    sync::{LazyLock, OnceLock},
};

/// Base URL of the identity provider's REST API.
/// Trailing slashes are stripped so endpoint paths can be appended directly.
pub(crate) static IDP_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    let raw = env::var("IDP_BASE_URL").expect("IDP_BASE_URL must be set");
    let parsed = url::Url::parse(&raw).expect("IDP_BASE_URL must be a valid URL");
    if !matches!(parsed.scheme(), "http" | "https") {
        panic!("IDP_BASE_URL must be an http(s) URL");
    }
    raw.trim_end_matches('/').to_string()
});

/// Public (anonymous) API key, sent with every user-scoped call.
pub(crate) static IDP_ANON_KEY: LazyLock<String> =
    LazyLock::new(|| env::var("IDP_ANON_KEY").expect("IDP_ANON_KEY must be set"));

/// Privileged service-role key. Used only by the admin endpoints; never
/// sent on user-scoped calls.
pub(crate) static IDP_SERVICE_ROLE_KEY: LazyLock<String> =
    LazyLock::new(|| env::var("IDP_SERVICE_ROLE_KEY").expect("IDP_SERVICE_ROLE_KEY must be set"));

/// Site base URL, used to construct email redirect links.
pub(crate) static ORIGIN: LazyLock<String> =
    LazyLock::new(|| env::var("ORIGIN").expect("Missing ORIGIN!"));

static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

pub(crate) fn get_client() -> &'static reqwest::Client {
    // The client is process-global; idle keep-alive connections must not
    // outlive the runtime that created them.
    HTTP_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .expect("failed to build HTTP client")
    })
}

pub(crate) fn endpoint(path: &str) -> String {
    format!("{}{}", IDP_BASE_URL.as_str(), path)
}
