//! Stripe integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::license::PackageType;

use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stripe Price ID for a paid package; Free has no checkout
pub fn price_id_for(state: &AppState, package: PackageType) -> Option<&str> {
    match package {
        PackageType::Free => None,
        PackageType::Single => Some(&state.stripe_single_price_id),
        PackageType::Freelancer => Some(&state.stripe_freelancer_price_id),
        PackageType::Agency => Some(&state.stripe_agency_price_id),
    }
}

/// Create a Stripe Customer
pub async fn create_customer(
    secret_key: &str,
    email: &str,
    user_id: &str,
) -> Result<String, BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post("https://api.stripe.com/v1/customers")
        .basic_auth(secret_key, None::<&str>)
        .form(&[("email", email), ("metadata[user_id]", user_id)])
        .send()
        .await?
        .json()
        .await?;

    resp["id"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe create_customer failed: {resp}").into())
}

/// Create a Stripe Checkout Session (one-time payment for a yearly license)
pub async fn create_checkout_session(
    secret_key: &str,
    customer_id: &str,
    price_id: &str,
    package: PackageType,
    user_id: &str,
    success_url: &str,
    cancel_url: &str,
) -> Result<String, BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post("https://api.stripe.com/v1/checkout/sessions")
        .basic_auth(secret_key, None::<&str>)
        .form(&[
            ("customer", customer_id),
            ("mode", "payment"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("allow_promotion_codes", "true"),
            ("metadata[package]", package.as_db()),
            ("metadata[user_id]", user_id),
        ])
        .send()
        .await?
        .json()
        .await?;

    resp["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe create_checkout failed: {resp}").into())
}

/// Verify a Stripe webhook signature (HMAC-SHA256 over `t.payload`)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(signed_payload.as_bytes());

    // Constant-time comparison via verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")?;

    // Reject events older than 5 minutes (replay window)
    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > 300 {
        return Err("Webhook timestamp too old");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str, ts: i64) -> String {
        let signed = format!("{ts}.{}", std::str::from_utf8(payload).unwrap());
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed.as_bytes());
        format!("t={ts},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let ts = chrono::Utc::now().timestamp();
        let header = sign(payload, "whsec_test", ts);
        assert!(verify_webhook_signature(payload, &header, "whsec_test").is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{}";
        let ts = chrono::Utc::now().timestamp();
        let header = sign(payload, "whsec_test", ts);
        assert!(verify_webhook_signature(payload, &header, "whsec_other").is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let ts = chrono::Utc::now().timestamp() - 600;
        let header = sign(payload, "whsec_test", ts);
        assert_eq!(
            verify_webhook_signature(payload, &header, "whsec_test"),
            Err("Webhook timestamp too old")
        );
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(verify_webhook_signature(b"{}", "", "s").is_err());
        assert!(verify_webhook_signature(b"{}", "t=123", "s").is_err());
        assert!(verify_webhook_signature(b"{}", "t=123,v1=zz", "s").is_err());
    }
}
