//! Shared test initialization.
//!
//! Loads `.env_test` (falling back to `.env`), fills in safe defaults
//! for any variable still missing, and initializes the stores. Unit
//! tests that touch the database or cache call
//! `init_test_environment()` first.

use std::sync::Once;

const TEST_ENV_DEFAULTS: &[(&str, &str)] = &[
    ("IDP_BASE_URL", "http://127.0.0.1:9470"),
    ("IDP_ANON_KEY", "test-anon-key"),
    ("IDP_SERVICE_ROLE_KEY", "test-service-role-key"),
    ("ORIGIN", "http://127.0.0.1:3000"),
    ("GENERIC_DATA_STORE_TYPE", "sqlite"),
    (
        "GENERIC_DATA_STORE_URL",
        "sqlite:file:idb_test?mode=memory&cache=shared",
    ),
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
    ("GENERIC_CACHE_STORE_URL", "memory"),
];

pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        for (key, value) in TEST_ENV_DEFAULTS {
            if std::env::var(key).is_err() {
                // Env manipulation is process-global, hence unsafe
                unsafe {
                    std::env::set_var(key, value);
                }
            }
        }
    });

    ensure_database_initialized().await;
}

async fn ensure_database_initialized() {
    use crate::profile::ProfileStore;

    if let Err(e) = crate::storage::init().await {
        eprintln!("Warning: Failed to initialize stores: {e}");
    }
    if let Err(e) = ProfileStore::init().await {
        eprintln!("Warning: Failed to initialize ProfileStore: {e}");
    }
}
