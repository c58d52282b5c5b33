//! Stripe webhook handler
//!
//! POST /stripe/webhook — handles Stripe events (raw body for signature
//! verification). Fulfillment happens here: the checkout endpoint only
//! starts the session; the license exists once Stripe confirms payment.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use shared::license::{LicenseStatus, PackageType};

use crate::state::AppState;
use crate::util::{generate_token, now_millis, token_digest};
use crate::{db, email, licensing, stripe};

/// Paid licenses run for one year from purchase
const LICENSE_TERM_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// German VAT, applied to all sales
const VAT_RATE_PERCENT: i32 = 19;

/// Handle incoming Stripe webhook events
///
/// Must receive raw body (not JSON) for HMAC signature verification.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Get Stripe-Signature header
    let sig_header = match headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(s) => s,
        None => {
            tracing::warn!("Missing Stripe-Signature header");
            return StatusCode::BAD_REQUEST;
        }
    };

    // 2. Verify signature
    if let Err(e) =
        stripe::verify_webhook_signature(&body, sig_header, &state.stripe_webhook_secret)
    {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    // 3. Parse JSON event
    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    tracing::info!(event_type = event_type, "Received Stripe webhook");

    // 4. Idempotency: INSERT first, check rows_affected (no TOCTOU window)
    let event_id = match event["id"].as_str() {
        Some(id) => id,
        None => {
            tracing::warn!("Webhook event missing id");
            return StatusCode::BAD_REQUEST;
        }
    };

    let now = now_millis();
    let insert_result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type, processed_at)
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(now)
    .execute(&state.pool)
    .await;

    match insert_result {
        Ok(r) if r.rows_affected() == 0 => {
            tracing::info!(event_id = event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        Ok(_) => {} // New event, proceed
    }

    // 5. Handle event types
    match event_type {
        "checkout.session.completed" => handle_checkout_completed(&state, &event).await,
        "charge.refunded" => handle_charge_refunded(&state, &event).await,
        _ => {
            tracing::debug!(event_type = event_type, "Unhandled webhook event type");
            StatusCode::OK
        }
    }
}

/// checkout.session.completed → issue license, write invoice, mail the key
async fn handle_checkout_completed(state: &AppState, event: &serde_json::Value) -> StatusCode {
    let obj = match event.get("data").and_then(|d| d.get("object")) {
        Some(o) => o,
        None => return StatusCode::OK,
    };

    let customer_id = match obj["customer"].as_str() {
        Some(s) => s,
        None => {
            tracing::warn!("checkout.session.completed missing customer");
            return StatusCode::OK;
        }
    };

    let package = match obj
        .get("metadata")
        .and_then(|m| m["package"].as_str())
        .and_then(PackageType::from_db)
    {
        Some(p) => p,
        None => {
            tracing::warn!("checkout.session.completed missing package metadata");
            return StatusCode::OK;
        }
    };

    // Resolve the buyer: customer id first, metadata user_id as fallback
    let user = match db::users::find_by_stripe_customer(&state.pool, customer_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            let user_id = obj.get("metadata").and_then(|m| m["user_id"].as_str());
            match user_id {
                Some(id) => match db::users::find_by_id(&state.pool, id).await {
                    Ok(Some(u)) => u,
                    _ => {
                        tracing::warn!(customer_id = customer_id, "No user for Stripe customer");
                        return StatusCode::OK;
                    }
                },
                None => {
                    tracing::warn!(customer_id = customer_id, "No user for Stripe customer");
                    return StatusCode::OK;
                }
            }
        }
        Err(e) => {
            tracing::error!(%e, "DB error finding user by Stripe customer");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let now = now_millis();

    // Issue the license
    let license_key = match licensing::keygen::generate_unique_key(&state.pool, package).await {
        Ok(k) => k,
        Err(e) => {
            let err: shared::error::AppError = e.into();
            tracing::error!(code = %err.code, "License key generation failed");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    let expires_at = package.is_paid().then_some(now + LICENSE_TERM_MS);

    let license_id = match db::licenses::create(
        &state.pool,
        &license_key,
        package,
        expires_at,
        Some(&user.id),
        now,
    )
    .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(%e, "Failed to create license");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    // Invoice: Stripe reports the gross amount, VAT is derived from it
    let gross = obj["amount_total"].as_i64().unwrap_or(0);
    let (net, tax) = split_gross(gross);
    let currency = obj["currency"].as_str().unwrap_or("eur").to_uppercase();
    let payment_ref = obj["payment_intent"].as_str();

    let invoice = match db::invoices::create(
        &state.pool,
        &db::invoices::CreateInvoice {
            user_id: &user.id,
            license_id: Some(license_id),
            net_amount_cents: net,
            tax_amount_cents: tax,
            gross_amount_cents: gross,
            tax_rate_percent: VAT_RATE_PERCENT,
            currency: &currency,
            stripe_payment_ref: payment_ref,
            now,
        },
    )
    .await
    {
        Ok(inv) => inv,
        Err(e) => {
            tracing::error!(%e, "Failed to create invoice");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    tracing::info!(
        user_id = %user.id,
        license_key = %license_key,
        invoice = %invoice.invoice_number,
        package = package.as_db(),
        "License issued via Stripe checkout"
    );

    // Shadow accounts get a password-set link alongside the key
    let password_set_url = if user.is_shadow() {
        let token = generate_token();
        match db::password_tokens::create(&state.pool, &token_digest(&token), &user.id, now).await
        {
            Ok(()) => Some(format!("{}/passwort?token={token}", state.portal_base_url)),
            Err(e) => {
                tracing::warn!(%e, "Failed to store password token");
                None
            }
        }
    } else {
        None
    };

    // License and invoice are committed; mail failures are logged, not fatal
    let _ = email::send_license_key(
        &state.ses,
        &state.ses_from_email,
        &user.email,
        &license_key,
        package.as_db(),
        password_set_url.as_deref(),
    )
    .await;

    let _ = email::send_invoice_notice(
        &state.ses,
        &state.ses_from_email,
        &user.email,
        &invoice.invoice_number,
        &crate::pdf::format_eur(gross),
        &format!(
            "{}/rechnungen/{}",
            state.portal_base_url, invoice.id
        ),
    )
    .await;

    StatusCode::OK
}

/// charge.refunded → cancel the license behind the refunded payment
async fn handle_charge_refunded(state: &AppState, event: &serde_json::Value) -> StatusCode {
    let obj = match event.get("data").and_then(|d| d.get("object")) {
        Some(o) => o,
        None => return StatusCode::OK,
    };

    let payment_ref = match obj["payment_intent"].as_str() {
        Some(s) => s,
        None => return StatusCode::OK,
    };

    let invoice = match db::invoices::find_by_payment_ref(&state.pool, payment_ref).await {
        Ok(Some(inv)) => inv,
        Ok(None) => {
            tracing::warn!(payment_ref = payment_ref, "Refund for unknown payment");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(%e, "DB error finding invoice for refund");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let now = now_millis();
    let _ = db::invoices::update_status(&state.pool, invoice.id, "refunded").await;

    if let Some(license_id) = invoice.license_id {
        if let Err(e) =
            db::licenses::update_status(&state.pool, license_id, LicenseStatus::Cancelled, now)
                .await
        {
            tracing::error!(%e, "Failed to cancel refunded license");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }

        if let (Ok(Some(license)), Ok(Some(user))) = (
            db::licenses::find_by_id(&state.pool, license_id).await,
            db::users::find_by_id(&state.pool, &invoice.user_id).await,
        ) {
            tracing::info!(license_key = %license.license_key, "License cancelled after refund");
            let _ = email::send_license_cancelled(
                &state.ses,
                &state.ses_from_email,
                &user.email,
                &license.license_key,
            )
            .await;
        }
    }

    StatusCode::OK
}

/// Split a gross amount into net + VAT portions (VAT already included in
/// the Stripe price). Rounds the net down so net + tax always equals gross.
fn split_gross(gross_cents: i64) -> (i64, i64) {
    let net = gross_cents * 100 / (100 + i64::from(VAT_RATE_PERCENT));
    (net, gross_cents - net)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_gross_adds_up() {
        for gross in [0, 1, 4_900, 9_900, 29_900, 123_457] {
            let (net, tax) = split_gross(gross);
            assert_eq!(net + tax, gross);
            assert!(tax >= 0 && net >= 0);
        }
    }

    #[test]
    fn test_split_gross_rate() {
        // 119,00 € gross at 19% → 100,00 € net + 19,00 € VAT
        assert_eq!(split_gross(11_900), (10_000, 1_900));
    }
}
