//! Signed form tokens
//!
//! Format: `{issued_at_ms}.{hex hmac}` where the MAC covers
//! `{form_id}.{issued_at_ms}`. Bots that scrape a form and replay it later,
//! or post without ever loading the form, fail this check.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Tokens older than this are rejected
pub const MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Issue a token for a form
pub fn issue(secret: &str, form_id: &str, now: i64) -> String {
    format!("{now}.{}", mac_hex(secret, form_id, now))
}

/// Verify a token: MAC in constant time, then the age window
pub fn verify(secret: &str, form_id: &str, token: &str, now: i64) -> bool {
    let Some((ts_str, sig)) = token.split_once('.') else {
        return false;
    };
    let Ok(issued_at) = ts_str.parse::<i64>() else {
        return false;
    };

    let Ok(sig_bytes) = hex::decode(sig) else {
        return false;
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload(form_id, issued_at).as_bytes());
    if mac.verify_slice(&sig_bytes).is_err() {
        return false;
    }

    issued_at <= now && now - issued_at <= MAX_AGE_MS
}

fn payload(form_id: &str, issued_at: i64) -> String {
    format!("{form_id}.{issued_at}")
}

fn mac_hex(secret: &str, form_id: &str, issued_at: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload(form_id, issued_at).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-guard-secret";

    #[test]
    fn test_round_trip() {
        let t = issue(SECRET, "comment-form", 1_000_000);
        assert!(verify(SECRET, "comment-form", &t, 1_000_500));
    }

    #[test]
    fn test_wrong_form_or_secret_fails() {
        let t = issue(SECRET, "comment-form", 1_000_000);
        assert!(!verify(SECRET, "contact-form", &t, 1_000_500));
        assert!(!verify("other-secret", "comment-form", &t, 1_000_500));
    }

    #[test]
    fn test_expired_and_future_tokens_fail() {
        let t = issue(SECRET, "comment-form", 1_000_000);
        assert!(!verify(SECRET, "comment-form", &t, 1_000_000 + MAX_AGE_MS + 1));
        // issued_at in the future relative to the verifier clock
        assert!(!verify(SECRET, "comment-form", &t, 999_000));
    }

    #[test]
    fn test_malformed_tokens_fail() {
        assert!(!verify(SECRET, "f", "", 1_000));
        assert!(!verify(SECRET, "f", "no-separator", 1_000));
        assert!(!verify(SECRET, "f", "123.nothex!", 1_000));
        assert!(!verify(SECRET, "f", "abc.deadbeef", 1_000));
    }
}
