use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::IdentityUser;
use crate::profile::{Profile, Role};
use crate::session::errors::SessionError;
use crate::storage::CacheData;

/// The per-request user view, assembled once per fetch from two named
/// sources: the provider's identity claims and the profile row. It is
/// never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub mfa_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    /// Identity claims supply id and email; the profile row supplies
    /// everything the application owns.
    pub fn assemble(claims: &IdentityUser, profile: &Profile) -> Self {
        Self {
            id: claims.id.clone(),
            email: claims.email.clone().unwrap_or_else(|| profile.email.clone()),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            role: profile.role,
            mfa_enabled: profile.mfa_enabled,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<AuthenticatedUser> for CacheData {
    fn from(data: AuthenticatedUser) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize AuthenticatedUser"),
        }
    }
}

impl TryFrom<CacheData> for AuthenticatedUser {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
