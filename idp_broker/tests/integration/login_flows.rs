//! End-to-end login orchestration against the mock provider.

use axum::http::header::SET_COOKIE;
use serial_test::serial;

use idp_broker::{
    CoordinationError, LoginStart, Profile, ProfileStore, Role, cancel_login, start_login,
    update_password, verify_login_mfa,
};

use crate::common::{self, mock_idp};

#[tokio::test]
#[serial]
async fn login_without_mfa_goes_straight_to_bootstrap() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);
    mock_idp::add_user(&state, "login-1", "login-1@example.com", "pw-initial");

    // Email is normalized before submission
    let outcome = start_login("  Login-1@Example.COM ", "pw-initial")
        .await
        .expect("login succeeds");

    let success = match outcome {
        LoginStart::Completed(success) => success,
        LoginStart::MfaRequired(_) => panic!("no factor enrolled, MFA must not trigger"),
    };

    // A session cookie is issued and the lazily created row is first-login
    assert!(success.headers.get(SET_COOKIE).is_some());
    assert!(success.first_login);
    assert_eq!(success.user.id, "login-1");
    assert_eq!(success.user.role, Role::User);

    let profile = ProfileStore::get_profile("login-1")
        .await
        .expect("get profile")
        .expect("profile bootstrapped");
    assert_eq!(profile.email, "login-1@example.com");

    // With no factor enrolled, no challenge was ever issued
    assert_eq!(state.lock().unwrap().challenge_calls, 0);
}

#[tokio::test]
#[serial]
async fn first_login_reads_true_exactly_once_around_password_set() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);
    mock_idp::add_user(&state, "login-2", "login-2@example.com", "pw-initial");

    // First login: forced password-set territory
    let outcome = start_login("login-2@example.com", "pw-initial")
        .await
        .expect("login succeeds");
    let success = match outcome {
        LoginStart::Completed(success) => success,
        LoginStart::MfaRequired(_) => panic!("unexpected MFA"),
    };
    assert!(success.first_login);

    // The forced step sets a password, which touches last activity
    update_password(&mock_idp::token_for("login-2"), "login-2", "a-new-password")
        .await
        .expect("password update succeeds");

    // Subsequent login is no longer first-time
    let outcome = start_login("login-2@example.com", "a-new-password")
        .await
        .expect("login succeeds");
    match outcome {
        LoginStart::Completed(success) => assert!(!success.first_login),
        LoginStart::MfaRequired(_) => panic!("unexpected MFA"),
    }
}

#[tokio::test]
#[serial]
async fn login_with_bad_credentials_is_generic() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);
    mock_idp::add_user(&state, "login-3", "login-3@example.com", "pw-right");

    let err = start_login("login-3@example.com", "pw-wrong")
        .await
        .expect_err("login must fail");

    // Same message whether the email or the password was wrong
    assert!(matches!(err, CoordinationError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
#[serial]
async fn empty_fields_fail_validation_before_any_network_call() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);

    let err = start_login("   ", "").await.expect_err("must fail");
    match err {
        CoordinationError::Validation(msgs) => {
            assert!(msgs.iter().any(|m| m.contains("email")));
            assert!(msgs.iter().any(|m| m.contains("password")));
        }
        other => panic!("expected Validation, got {other}"),
    }

    // The provider was never reached
    assert_eq!(state.lock().unwrap().token_calls, 0);
}

#[tokio::test]
#[serial]
async fn login_with_verified_factor_requires_mfa_and_allows_retry() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);
    mock_idp::add_user(&state, "login-4", "login-4@example.com", "pw-initial");
    mock_idp::add_verified_factor(&state, "login-4", "factor-login-4");

    let outcome = start_login("login-4@example.com", "pw-initial")
        .await
        .expect("credential step succeeds");
    let pending = match outcome {
        LoginStart::MfaRequired(pending) => pending,
        LoginStart::Completed(_) => panic!("a verified factor must force MFA"),
    };
    assert_eq!(pending.factor_id, "factor-login-4");

    // Malformed code: rejected on shape alone, no verify call goes out
    let verify_calls_before = state.lock().unwrap().verify_calls;
    let err = verify_login_mfa(&pending.login_id, "12ab56")
        .await
        .expect_err("malformed code must fail");
    assert!(matches!(err, CoordinationError::Validation(_)));
    assert_eq!(state.lock().unwrap().verify_calls, verify_calls_before);

    // Wrong code: provider rejects, ticket survives for the retry
    let err = verify_login_mfa(&pending.login_id, "654321")
        .await
        .expect_err("wrong code must fail");
    assert!(matches!(err, CoordinationError::CodeRejected(_)));

    // Right code on the same ticket: session granted
    let success = verify_login_mfa(&pending.login_id, mock_idp::VALID_CODE)
        .await
        .expect("retry with the right code succeeds");
    assert!(success.headers.get(SET_COOKIE).is_some());
    assert_eq!(success.user.id, "login-4");

    // The ticket was consumed by the successful verification
    let err = verify_login_mfa(&pending.login_id, mock_idp::VALID_CODE)
        .await
        .expect_err("consumed ticket must be rejected");
    assert!(matches!(err, CoordinationError::InvalidState(_)));
}

#[tokio::test]
#[serial]
async fn cancelled_login_ticket_is_gone() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);
    mock_idp::add_user(&state, "login-5", "login-5@example.com", "pw-initial");
    mock_idp::add_verified_factor(&state, "login-5", "factor-login-5");

    let outcome = start_login("login-5@example.com", "pw-initial")
        .await
        .expect("credential step succeeds");
    let pending = match outcome {
        LoginStart::MfaRequired(pending) => pending,
        LoginStart::Completed(_) => panic!("a verified factor must force MFA"),
    };

    cancel_login(&pending.login_id).await.expect("cancel succeeds");

    let err = verify_login_mfa(&pending.login_id, mock_idp::VALID_CODE)
        .await
        .expect_err("cancelled ticket must be rejected");
    assert!(matches!(err, CoordinationError::InvalidState(_)));
}

#[tokio::test]
#[serial]
async fn bootstrap_is_skipped_when_profile_already_exists() {
    let state = common::setup();
    common::init_broker().await;
    mock_idp::reset(&state);
    mock_idp::add_user(&state, "login-6", "login-6@example.com", "pw-initial");

    // An admin-invited user already has a (touched) profile row
    let mut existing = Profile::new(
        "login-6".to_string(),
        "login-6@example.com".to_string(),
        "Pre".to_string(),
        "Seeded".to_string(),
        Role::Admin,
    );
    existing.updated_at = existing.created_at + chrono::Duration::seconds(30);
    ProfileStore::upsert_profile(existing).await.expect("seed");

    let outcome = start_login("login-6@example.com", "pw-initial")
        .await
        .expect("login succeeds");
    match outcome {
        LoginStart::Completed(success) => {
            // The seeded row is used as-is: role survives, not first-login
            assert!(!success.first_login);
            assert_eq!(success.user.role, Role::Admin);
            assert_eq!(success.user.first_name, "Pre");
        }
        LoginStart::MfaRequired(_) => panic!("unexpected MFA"),
    }
}
