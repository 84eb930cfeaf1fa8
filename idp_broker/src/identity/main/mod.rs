mod admin;
mod auth;
mod mfa;
mod utils;

pub(crate) use admin::{delete_user, invite_user_by_email};
pub(crate) use auth::{
    exchange_code_for_session, get_user, send_reset_password_email, sign_in_with_password,
    sign_out, update_password,
};
pub(crate) use mfa::{
    create_challenge, enroll_totp, list_factors, unenroll_factor, verify_challenge,
};
