use crate::storage::GENERIC_DATA_STORE;

use crate::profile::{errors::ProfileError, types::Profile};

use super::postgres::*;
use super::sqlite::*;

pub struct ProfileStore;

impl ProfileStore {
    /// Initialize the profile table
    pub async fn init() -> Result<(), ProfileError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(ProfileError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Get a profile by the provider user id
    pub async fn get_profile(id: &str) -> Result<Option<Profile>, ProfileError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_profile_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            get_profile_postgres(pool, id).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get a profile by email (duplicate checks on admin create)
    pub async fn get_profile_by_email(email: &str) -> Result<Option<Profile>, ProfileError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_profile_by_email_sqlite(pool, email).await
        } else if let Some(pool) = store.as_postgres() {
            get_profile_by_email_postgres(pool, email).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }

    /// All profiles, newest first
    pub async fn get_all_profiles() -> Result<Vec<Profile>, ProfileError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_all_profiles_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            get_all_profiles_postgres(pool).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Create or update a profile
    pub async fn upsert_profile(profile: Profile) -> Result<Profile, ProfileError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            upsert_profile_sqlite(pool, profile).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_profile_postgres(pool, profile).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn delete_profile(id: &str) -> Result<(), ProfileError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_profile_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            delete_profile_postgres(pool, id).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }
}
