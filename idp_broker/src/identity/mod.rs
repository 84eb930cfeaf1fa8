//! Typed client for the external identity provider's REST API.
//!
//! Every call in this module is a thin `reqwest` wrapper: credentials,
//! sessions, TOTP secrets and code verification are all owned by the
//! provider. Nothing here performs local cryptography.

pub(crate) mod config;
mod errors;
mod main;
mod types;

pub use errors::IdentityError;
pub use types::{
    ChallengeCreated, EnrolledFactor, FactorStatus, FactorType, IdentityUser, InvitedUser,
    MfaFactor, SessionTokens, TotpProvisioning,
};

pub(crate) use main::{
    create_challenge, delete_user, enroll_totp, exchange_code_for_session, get_user,
    invite_user_by_email, list_factors, send_reset_password_email, sign_in_with_password, sign_out,
    unenroll_factor, update_password, verify_challenge,
};
