//! Admin user management spanning the identity provider and the profile
//! table.
//!
//! Create and delete are two independent writes with an explicit,
//! best-effort compensating action on partial failure. There is no
//! transaction across the two stores; a failed compensation leaves them
//! diverged with a log line as the only evidence.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::identity::{self, IdentityError};
use crate::profile::{Profile, ProfileStore, Role};
use crate::session::AuthenticatedUser;

use super::errors::CoordinationError;
use super::validation::{is_valid_email, normalize_email};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

fn require_admin(caller: &AuthenticatedUser) -> Result<(), CoordinationError> {
    if !caller.is_admin() {
        tracing::warn!("User {} attempted an admin operation", caller.id);
        return Err(CoordinationError::Unauthorized.log());
    }
    Ok(())
}

fn parse_role(role: &str, field_errors: &mut Vec<String>) -> Option<Role> {
    match role.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            field_errors.push("role must be one of 'user' or 'admin'".to_string());
            None
        }
    }
}

fn validate_name_fields(
    first_name: &str,
    last_name: &str,
    field_errors: &mut Vec<String>,
) -> (String, String) {
    let first_name = first_name.trim().to_string();
    let last_name = last_name.trim().to_string();
    if first_name.is_empty() {
        field_errors.push("firstName is required".to_string());
    }
    if last_name.is_empty() {
        field_errors.push("lastName is required".to_string());
    }
    (first_name, last_name)
}

fn validate_create_request(
    request: &CreateUserRequest,
) -> Result<(String, String, String, Role), CoordinationError> {
    let mut field_errors = Vec::new();

    let (first_name, last_name) =
        validate_name_fields(&request.first_name, &request.last_name, &mut field_errors);

    let email = normalize_email(&request.email);
    if email.is_empty() {
        field_errors.push("email is required".to_string());
    } else if !is_valid_email(&email) {
        field_errors.push("email is not a valid email address".to_string());
    }

    let role = parse_role(&request.role, &mut field_errors);

    if !field_errors.is_empty() {
        return Err(CoordinationError::Validation(field_errors).log());
    }

    Ok((
        first_name,
        last_name,
        email,
        role.expect("role parsed when no field errors"),
    ))
}

/// All profile rows, newest first.
pub async fn list_users_admin(
    caller: &AuthenticatedUser,
) -> Result<Vec<Profile>, CoordinationError> {
    require_admin(caller)?;
    Ok(ProfileStore::get_all_profiles().await?)
}

/// Create a user: validate, reject duplicate emails before touching the
/// provider, invite through the provider's admin API, then upsert the
/// profile row. A profile-write failure after a successful invite
/// triggers a best-effort compensating delete of the provider account.
pub async fn create_user_admin(
    caller: &AuthenticatedUser,
    request: CreateUserRequest,
) -> Result<Profile, CoordinationError> {
    require_admin(caller)?;
    let (first_name, last_name, email, role) = validate_create_request(&request)?;

    if ProfileStore::get_profile_by_email(&email).await?.is_some() {
        return Err(CoordinationError::DuplicateEmail(email).log());
    }

    let invited = identity::invite_user_by_email(
        &email,
        json!({
            "first_name": first_name,
            "last_name": last_name,
            "role": role.as_str(),
        }),
    )
    .await?;

    tracing::info!(
        "Admin {} invited {} (provider id {})",
        caller.id,
        email,
        invited.id
    );

    // An invite race (first login completing before we get here) may
    // have created the row already; update it instead of inserting.
    let profile = match ProfileStore::get_profile(&invited.id).await {
        Ok(Some(existing)) => Profile {
            email: email.clone(),
            first_name,
            last_name,
            role,
            updated_at: Utc::now(),
            ..existing
        },
        Ok(None) => Profile::new(invited.id.clone(), email.clone(), first_name, last_name, role),
        Err(e) => {
            compensate_invite(&invited.id).await;
            return Err(e.into());
        }
    };

    match ProfileStore::upsert_profile(profile).await {
        Ok(profile) => Ok(profile),
        Err(e) => {
            compensate_invite(&invited.id).await;
            Err(e.into())
        }
    }
}

/// Best-effort removal of a provider account created earlier in the same
/// request. Failure is logged, not retried.
async fn compensate_invite(provider_user_id: &str) {
    tracing::warn!(
        "Profile write failed after invite; deleting provider account {}",
        provider_user_id
    );
    if let Err(e) = identity::delete_user(provider_user_id).await {
        tracing::error!(
            "Compensating delete of provider account {} failed, stores have diverged: {}",
            provider_user_id,
            e
        );
    }
}

/// Update names and role on the profile row. Email and password are
/// immutable through this path, so the provider record is not touched.
pub async fn update_user_admin(
    caller: &AuthenticatedUser,
    user_id: &str,
    request: UpdateUserRequest,
) -> Result<Profile, CoordinationError> {
    require_admin(caller)?;

    let mut field_errors = Vec::new();
    let (first_name, last_name) =
        validate_name_fields(&request.first_name, &request.last_name, &mut field_errors);
    let role = parse_role(&request.role, &mut field_errors);
    if !field_errors.is_empty() {
        return Err(CoordinationError::Validation(field_errors).log());
    }

    let profile = ProfileStore::get_profile(user_id)
        .await?
        .ok_or_else(|| {
            CoordinationError::ResourceNotFound {
                resource_type: "User".to_string(),
                resource_id: user_id.to_string(),
            }
            .log()
        })?;

    let updated = Profile {
        first_name,
        last_name,
        role: role.expect("role parsed when no field errors"),
        updated_at: Utc::now(),
        ..profile
    };

    let profile = ProfileStore::upsert_profile(updated).await?;
    tracing::info!("Admin {} updated user {}", caller.id, user_id);
    Ok(profile)
}

/// Delete a user from both stores. A missing profile row fails fast with
/// not-found and never reaches the provider. If the provider delete
/// fails after the row is gone, a minimal row with the default role is
/// reinserted as rollback, and the upstream failure is returned to the
/// caller regardless of the rollback outcome.
pub async fn delete_user_admin(
    caller: &AuthenticatedUser,
    user_id: &str,
) -> Result<(), CoordinationError> {
    require_admin(caller)?;

    let profile = ProfileStore::get_profile(user_id)
        .await?
        .ok_or_else(|| {
            CoordinationError::ResourceNotFound {
                resource_type: "User".to_string(),
                resource_id: user_id.to_string(),
            }
            .log()
        })?;

    ProfileStore::delete_profile(user_id).await?;

    match identity::delete_user(user_id).await {
        Ok(()) => {
            tracing::info!("Admin {} deleted user {}", caller.id, user_id);
            Ok(())
        }
        // The provider account was already gone; the stores now agree.
        Err(IdentityError::NotFound) => {
            tracing::warn!(
                "Provider account {} was already absent during delete",
                user_id
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Provider delete of {} failed after profile delete, attempting rollback: {}",
                user_id,
                e
            );
            let rollback = Profile::new(
                profile.id.clone(),
                profile.email.clone(),
                profile.first_name.clone(),
                profile.last_name.clone(),
                Role::User,
            );
            if let Err(rollback_err) = ProfileStore::upsert_profile(rollback).await {
                tracing::error!(
                    "Rollback reinsert of profile {} failed, stores have diverged: {}",
                    user_id,
                    rollback_err
                );
            }
            Err(e.into())
        }
    }
}
