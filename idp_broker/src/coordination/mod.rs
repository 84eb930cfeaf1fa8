//! Authentication and user-management coordination module
//!
//! High-level functions that sequence calls between the identity
//! provider client, the profile store and the session layer. This is the
//! main entry point for most operations.
//!
//! Submodules:
//! - `admin`: admin-only user CRUD with best-effort compensation
//! - `errors`: error types specific to coordination operations
//! - `login`: credential sign-in, MFA verification, profile bootstrap
//! - `mfa`: TOTP enrollment, confirmation and removal
//! - `user`: password reset/update and the email-callback exchange
//! - `validation`: field-shape checks shared by the flows

mod admin;
mod errors;
mod login;
mod mfa;
mod user;
mod validation;

pub use admin::{
    CreateUserRequest, UpdateUserRequest, create_user_admin, delete_user_admin, list_users_admin,
    update_user_admin,
};

pub use login::{
    LoginStart, LoginSuccess, MfaChallengePending, cancel_login, start_login, verify_login_mfa,
};

pub use mfa::{
    EnrollmentStarted, cancel_totp_enrollment, confirm_totp_enrollment, disable_totp,
    start_totp_enrollment,
};

pub use user::{handle_auth_callback, request_password_reset, update_password};

pub use validation::is_totp_code_shape;

pub use errors::CoordinationError;
