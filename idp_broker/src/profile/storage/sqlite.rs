use crate::profile::{errors::ProfileError, types::Profile};
use crate::storage::DB_TABLE_USER_INFO;
use sqlx::{Pool, Sqlite};

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), ProfileError> {
    let table_name = DB_TABLE_USER_INFO.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY NOT NULL,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            mfa_enabled BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_profile_sqlite(
    pool: &Pool<Sqlite>,
    id: &str,
) -> Result<Option<Profile>, ProfileError> {
    let table_name = DB_TABLE_USER_INFO.as_str();

    sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {} WHERE id = ?
        "#,
        table_name
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))
}

pub(super) async fn get_profile_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<Profile>, ProfileError> {
    let table_name = DB_TABLE_USER_INFO.as_str();

    sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {} WHERE email = ?
        "#,
        table_name
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))
}

pub(super) async fn get_all_profiles_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<Vec<Profile>, ProfileError> {
    let table_name = DB_TABLE_USER_INFO.as_str();

    sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {} ORDER BY created_at DESC
        "#,
        table_name
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))
}

pub(super) async fn upsert_profile_sqlite(
    pool: &Pool<Sqlite>,
    profile: Profile,
) -> Result<Profile, ProfileError> {
    let table_name = DB_TABLE_USER_INFO.as_str();

    // Upsert profile with a single query
    sqlx::query(&format!(
        r#"
        INSERT INTO {} (id, email, first_name, last_name, role, mfa_enabled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            email = excluded.email,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            role = excluded.role,
            mfa_enabled = excluded.mfa_enabled,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at
        "#,
        table_name
    ))
    .bind(&profile.id)
    .bind(&profile.email)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(profile.role.as_str())
    .bind(profile.mfa_enabled)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))?;

    // Return updated profile
    Ok(profile)
}

pub(super) async fn delete_profile_sqlite(
    pool: &Pool<Sqlite>,
    id: &str,
) -> Result<(), ProfileError> {
    let table_name = DB_TABLE_USER_INFO.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {} WHERE id = ?
        "#,
        table_name
    ))
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))?;

    Ok(())
}
