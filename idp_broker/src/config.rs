//! Central configuration for the idp_broker crate

use std::sync::LazyLock;

/// Route prefix for all idp_broker endpoints
///
/// This is the main prefix under which all authentication and admin
/// endpoints will be mounted.
/// Default: "/idb"
pub static IDB_ROUTE_PREFIX: LazyLock<String> =
    LazyLock::new(|| std::env::var("IDB_ROUTE_PREFIX").unwrap_or_else(|_| "/idb".to_string()));
