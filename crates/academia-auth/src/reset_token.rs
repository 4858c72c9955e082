//! Stateless password-reset tokens.
//!
//! A token is `<base32(day)>-<base64url(hmac)>` where `day` is the number of
//! whole days since 2001-01-01 UTC (rounded up) and the HMAC-SHA256 covers the
//! user id, the current password hash, the last-login time and `day`.
//! Nothing is stored: verification rebuilds the token from the user's
//! *current* state, so changing the password or logging in again invalidates
//! every token issued before.

use std::fmt;
use std::sync::Arc;

use academia_core::Clock;
use academia_models::User;
use chrono::{DateTime, SecondsFormat, Utc};
use data_encoding::{BASE32_NOPAD, BASE64URL_NOPAD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

const KEY_SALT: &[u8] = b"academia.auth.reset_token";

/// 2001-01-01T00:00:00Z in Unix milliseconds.
const DAY_ZERO_MILLIS: i64 = 978_307_200_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResetTokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token")]
    Signing,
}

/// Whole days since 2001-01-01 UTC, rounded up.
pub fn days_since_epoch(at: DateTime<Utc>) -> i64 {
    let millis = at.timestamp_millis() - DAY_ZERO_MILLIS;
    -(-millis).div_euclid(MILLIS_PER_DAY)
}

#[derive(Clone)]
pub struct PasswordResetTokens {
    key: [u8; 32],
    timeout_days: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for PasswordResetTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordResetTokens")
            .field("timeout_days", &self.timeout_days)
            .finish_non_exhaustive()
    }
}

impl PasswordResetTokens {
    pub fn new(secret: &str, timeout_days: i64, clock: Arc<dyn Clock>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_SALT);
        hasher.update(secret.as_bytes());
        Self {
            key: hasher.finalize().into(),
            timeout_days,
            clock,
        }
    }

    pub fn make_token(&self, user: &User) -> Result<String, ResetTokenError> {
        self.token_for_day(user, days_since_epoch(self.clock.now()))
    }

    /// Check `token` against the user's current state.
    ///
    /// A token that fails the signature check is [`ResetTokenError::Invalid`]
    /// even when it is also old; `Expired` is only reported for genuine tokens.
    pub fn verify_token(&self, user: &User, token: &str) -> Result<(), ResetTokenError> {
        let (day_part, sig_part) = token.split_once('-').ok_or(ResetTokenError::Invalid)?;
        if day_part.is_empty() || sig_part.is_empty() {
            return Err(ResetTokenError::Invalid);
        }

        let day = BASE32_NOPAD
            .decode(day_part.as_bytes())
            .ok()
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|digits| digits.parse::<i64>().ok())
            .ok_or(ResetTokenError::Invalid)?;

        let expected = self.token_for_day(user, day)?;
        if !bool::from(expected.as_bytes().ct_eq(token.as_bytes())) {
            return Err(ResetTokenError::Invalid);
        }

        if days_since_epoch(self.clock.now()) - day > self.timeout_days {
            return Err(ResetTokenError::Expired);
        }
        Ok(())
    }

    fn token_for_day(&self, user: &User, day: i64) -> Result<String, ResetTokenError> {
        let day_part = BASE32_NOPAD.encode(day.to_string().as_bytes());
        let sig_part = BASE64URL_NOPAD.encode(&self.sign(&payload(user, day))?);
        Ok(format!("{day_part}-{sig_part}"))
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, ResetTokenError> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&self.key)
            .map_err(|_| ResetTokenError::Signing)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn payload(user: &User, day: i64) -> Vec<u8> {
    let mut value = Vec::with_capacity(128);
    value.extend_from_slice(user.id.to_string().as_bytes());
    value.extend_from_slice(user.password_hash.as_bytes());
    if let Some(last_login) = user.last_login {
        value.extend_from_slice(
            last_login
                .to_rfc3339_opts(SecondsFormat::Micros, true)
                .as_bytes(),
        );
    }
    value.extend_from_slice(day.to_string().as_bytes());
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use academia_core::FixedClock;
    use chrono::{Duration, TimeZone};

    fn setup() -> (PasswordResetTokens, FixedClock, User) {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 14, 30, 0).unwrap();
        let clock = FixedClock::new(start);
        let tokens = PasswordResetTokens::new("s3cr3t", 3, Arc::new(clock.clone()));
        let user = User::new(
            "Jane",
            Some("jane_doe"),
            Some("jane@example.com"),
            "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            vec!["student:".to_string()],
            start,
        );
        (tokens, clock, user)
    }

    #[test]
    fn test_days_since_epoch_rounds_up() {
        let epoch = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_since_epoch(epoch), 0);
        assert_eq!(days_since_epoch(epoch + Duration::milliseconds(1)), 1);
        assert_eq!(days_since_epoch(epoch + Duration::days(1)), 1);
        assert_eq!(days_since_epoch(epoch + Duration::hours(36)), 2);
        assert_eq!(days_since_epoch(epoch - Duration::hours(12)), 0);
        assert_eq!(days_since_epoch(epoch - Duration::hours(36)), -1);
    }

    #[test]
    fn test_token_shape() {
        let (tokens, clock, user) = setup();
        let token = tokens.make_token(&user).unwrap();
        let (day_part, sig_part) = token.split_once('-').unwrap();

        let day = String::from_utf8(BASE32_NOPAD.decode(day_part.as_bytes()).unwrap()).unwrap();
        assert_eq!(day, days_since_epoch(clock.now()).to_string());
        // 32-byte HMAC, unpadded base64url
        assert_eq!(sig_part.len(), 43);
        assert!(!token.contains('='));
    }

    #[test]
    fn test_valid_immediately() {
        let (tokens, _, user) = setup();
        let token = tokens.make_token(&user).unwrap();
        assert_eq!(tokens.verify_token(&user, &token), Ok(()));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let (tokens, _, user) = setup();
        for token in [
            "",
            "lmaooolol",
            "hahaha-sigsig-sig",
            "NRXWY-sigsig-sig",
            "HE4TS-sigsig-sig",
            "-sig",
            "GE-",
        ] {
            assert_eq!(
                tokens.verify_token(&user, token),
                Err(ResetTokenError::Invalid),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let (tokens, _, user) = setup();
        let token = tokens.make_token(&user).unwrap();
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let forged = String::from_utf8(bytes).unwrap();
        assert_eq!(tokens.verify_token(&user, &forged), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_password_change_invalidates() {
        let (tokens, _, mut user) = setup();
        let token = tokens.make_token(&user).unwrap();
        user.password_hash = "$2b$12$zyxwvutsrqponmlkjihgfe".to_string();
        assert_eq!(tokens.verify_token(&user, &token), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_login_invalidates() {
        let (tokens, clock, mut user) = setup();
        let token = tokens.make_token(&user).unwrap();
        user.last_login = Some(clock.now());
        assert_eq!(tokens.verify_token(&user, &token), Err(ResetTokenError::Invalid));

        let token = tokens.make_token(&user).unwrap();
        assert_eq!(tokens.verify_token(&user, &token), Ok(()));
        user.last_login = Some(clock.now() + Duration::seconds(1));
        assert_eq!(tokens.verify_token(&user, &token), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_other_user_or_secret_is_invalid() {
        let (tokens, clock, user) = setup();
        let token = tokens.make_token(&user).unwrap();

        let mut other = user.clone();
        other.id = uuid::Uuid::new_v4();
        assert_eq!(tokens.verify_token(&other, &token), Err(ResetTokenError::Invalid));

        let foreign = PasswordResetTokens::new("another", 3, Arc::new(clock));
        assert_eq!(foreign.verify_token(&user, &token), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_expiry_boundary() {
        let (tokens, clock, user) = setup();
        let token = tokens.make_token(&user).unwrap();

        clock.advance(Duration::days(2));
        assert_eq!(tokens.verify_token(&user, &token), Ok(()));
        clock.advance(Duration::days(1));
        assert_eq!(tokens.verify_token(&user, &token), Ok(()));
        clock.advance(Duration::days(1));
        assert_eq!(tokens.verify_token(&user, &token), Err(ResetTokenError::Expired));
    }

    #[test]
    fn test_forged_old_token_is_invalid_not_expired() {
        let (tokens, clock, user) = setup();
        let old = tokens.make_token(&user).unwrap();
        clock.advance(Duration::days(10));

        let (day_part, _) = old.split_once('-').unwrap();
        let forged = format!("{day_part}-AAAA");
        assert_eq!(tokens.verify_token(&user, &forged), Err(ResetTokenError::Invalid));
        assert_eq!(tokens.verify_token(&user, &old), Err(ResetTokenError::Expired));
    }
}
