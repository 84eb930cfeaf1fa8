//! Shared setup for the integration tests: environment variables, the
//! mock identity provider and broker/store initialization.

pub mod mock_idp;

use std::net::TcpStream;
use std::sync::OnceLock;
use std::time::Duration;

use mock_idp::SharedState;

pub const MOCK_IDP_ADDR: &str = "127.0.0.1:9470";

const TEST_ENV: &[(&str, &str)] = &[
    ("IDP_BASE_URL", "http://127.0.0.1:9470"),
    ("IDP_ANON_KEY", "test-anon-key"),
    ("IDP_SERVICE_ROLE_KEY", "test-service-role-key"),
    ("ORIGIN", "http://127.0.0.1:3000"),
    ("GENERIC_DATA_STORE_TYPE", "sqlite"),
    (
        "GENERIC_DATA_STORE_URL",
        "sqlite:file:idb_integration_test?mode=memory&cache=shared",
    ),
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
    ("GENERIC_CACHE_STORE_URL", "memory"),
];

static MOCK_STATE: OnceLock<SharedState> = OnceLock::new();

/// Set env vars, start the mock provider (once per test binary, on a
/// dedicated thread so it outlives individual test runtimes) and return
/// a handle to its mutable state.
pub fn setup() -> SharedState {
    MOCK_STATE
        .get_or_init(|| {
            // Environment must be in place before any LazyLock config is touched
            for (key, value) in TEST_ENV {
                if std::env::var(key).is_err() {
                    unsafe {
                        std::env::set_var(key, value);
                    }
                }
            }

            let state = mock_idp::new_state();
            let server_state = state.clone();
            std::thread::spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("mock idp runtime");
                rt.block_on(async move {
                    let listener = tokio::net::TcpListener::bind(MOCK_IDP_ADDR)
                        .await
                        .expect("bind mock idp");
                    axum::serve(listener, mock_idp::router(server_state))
                        .await
                        .expect("serve mock idp");
                });
            });

            wait_for_mock_idp();
            state
        })
        .clone()
}

fn wait_for_mock_idp() {
    for _ in 0..100 {
        if TcpStream::connect(MOCK_IDP_ADDR).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("mock identity provider did not come up on {MOCK_IDP_ADDR}");
}

/// Initialize the broker's stores. Idempotent; call at the start of each
/// test after `setup()`.
pub async fn init_broker() {
    idp_broker::init().await.expect("broker init");
}
