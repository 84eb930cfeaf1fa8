//! Field-shape checks shared by the coordination flows.
//!
//! These are format checks only. Nothing here verifies a code or an
//! address; correctness is always the provider's call.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

static TOTP_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("code regex must compile"));

/// Trim and lower-case an email before it goes anywhere.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Exactly six ASCII digits. Checked before any network call; the code's
/// correctness is still verified only by the provider.
pub fn is_totp_code_shape(code: &str) -> bool {
    TOTP_CODE_RE.is_match(code)
}
