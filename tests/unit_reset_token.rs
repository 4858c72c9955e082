use std::sync::Arc;

use academia_auth::{PasswordResetTokens, ResetTokenError};
use academia_core::{Clock, FixedClock};
use academia_models::User;
use chrono::{Duration, TimeZone, Utc};

const SECRET: &str = "reset-token-test-secret";
const TIMEOUT_DAYS: i64 = 3;

fn setup() -> (FixedClock, PasswordResetTokens, User) {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 14, 22, 45, 0).unwrap());
    let tokens = PasswordResetTokens::new(SECRET, TIMEOUT_DAYS, Arc::new(clock.clone()));
    let user = User::new(
        "Jane Doe",
        Some("jane_doe"),
        Some("jane@example.com"),
        "$2b$04$abcdefghijklmnopqrstuu1234567890abcdefghijklmnopqrstu".to_string(),
        vec!["student:".to_string()],
        clock.now(),
    );
    (clock, tokens, user)
}

#[test]
fn test_token_lifetime() {
    let (clock, tokens, user) = setup();
    let token = tokens.make_token(&user).unwrap();
    assert_eq!(tokens.verify_token(&user, &token), Ok(()));

    clock.advance(Duration::days(TIMEOUT_DAYS - 1));
    assert_eq!(tokens.verify_token(&user, &token), Ok(()));

    clock.advance(Duration::days(1));
    assert_eq!(tokens.verify_token(&user, &token), Ok(()));

    clock.advance(Duration::days(1));
    assert_eq!(
        tokens.verify_token(&user, &token),
        Err(ResetTokenError::Expired)
    );
}

#[test]
fn test_token_is_stable_within_a_day() {
    let (clock, tokens, user) = setup();
    let first = tokens.make_token(&user).unwrap();
    clock.advance(Duration::minutes(10));
    assert_eq!(tokens.make_token(&user).unwrap(), first);
}

#[test]
fn test_token_survives_a_reload_of_the_same_user() {
    let (_, tokens, user) = setup();
    let token = tokens.make_token(&user).unwrap();
    let reloaded = user.clone();
    assert_eq!(tokens.verify_token(&reloaded, &token), Ok(()));
}

#[test]
fn test_token_dies_with_password_change() {
    let (_, tokens, mut user) = setup();
    let token = tokens.make_token(&user).unwrap();

    user.password_hash = "$2b$04$zyxwvutsrqponmlkjihgfeu1234567890abcdefghijklmnopqrstu".to_string();
    assert_eq!(
        tokens.verify_token(&user, &token),
        Err(ResetTokenError::Invalid)
    );
}

#[test]
fn test_token_dies_with_login() {
    let (clock, tokens, mut user) = setup();
    let token = tokens.make_token(&user).unwrap();

    clock.advance(Duration::minutes(1));
    user.last_login = Some(clock.now());
    assert_eq!(
        tokens.verify_token(&user, &token),
        Err(ResetTokenError::Invalid)
    );
}

#[test]
fn test_token_is_bound_to_the_secret_and_the_user() {
    let (clock, tokens, user) = setup();
    let token = tokens.make_token(&user).unwrap();

    let other_secret =
        PasswordResetTokens::new("another-secret", TIMEOUT_DAYS, Arc::new(clock.clone()));
    assert_eq!(
        other_secret.verify_token(&user, &token),
        Err(ResetTokenError::Invalid)
    );

    let mut other_user = user.clone();
    other_user.id = uuid::Uuid::new_v4();
    assert_eq!(
        tokens.verify_token(&other_user, &token),
        Err(ResetTokenError::Invalid)
    );
}

#[test]
fn test_day_prefix_cannot_be_moved() {
    let (clock, tokens, user) = setup();
    let token = tokens.make_token(&user).unwrap();
    clock.advance(Duration::days(1));
    let tomorrow = tokens.make_token(&user).unwrap();

    let (_, signature) = token.split_once('-').unwrap();
    let (tomorrow_day, _) = tomorrow.split_once('-').unwrap();
    let shifted = format!("{tomorrow_day}-{signature}");
    assert_eq!(
        tokens.verify_token(&user, &shifted),
        Err(ResetTokenError::Invalid)
    );
}
