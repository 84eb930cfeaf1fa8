use serde::{Deserialize, Serialize};

/// Opaque serialized value held by the generic cache store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CacheData {
    pub(crate) value: String,
}
