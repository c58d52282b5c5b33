//! Checkout endpoint
//!
//! POST /api/checkout — public entry from the pricing page. The buyer may
//! not have an account yet; a shadow account is created so the webhook has
//! somewhere to attach the license.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::license::PackageType;

use super::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::stripe;
use crate::util::now_millis;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub package_type: PackageType,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

pub async fn create_checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<CheckoutResponse> {
    let Some(price_id) = stripe::price_id_for(&state, req.package_type) else {
        return Err(AppError::invalid_request(
            "FREE hat keinen Checkout; die Lizenz wird direkt ausgestellt",
        ));
    };
    let price_id = price_id.to_string();

    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("E-Mail-Adresse ungültig"));
    }

    let now = now_millis();

    // Find-or-create the buyer; new buyers start as shadow accounts
    let user = match db::users::find_by_email(&state.pool, &email).await.map_err(db_err)? {
        Some(u) => u,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            db::users::create_shadow(&state.pool, &id, &email, now)
                .await
                .map_err(db_err)?;
            tracing::info!(email = %email, "Shadow account created for checkout");
            db::users::find_by_id(&state.pool, &id)
                .await
                .map_err(db_err)?
                .ok_or_else(|| AppError::new(ErrorCode::InternalError))?
        }
    };

    // Find-or-create the Stripe customer
    let customer_id = match user.stripe_customer_id {
        Some(ref c) => c.clone(),
        None => {
            let c = stripe::create_customer(&state.stripe_secret_key, &user.email, &user.id)
                .await
                .map_err(|e| {
                    tracing::error!("Stripe customer creation failed: {e}");
                    AppError::new(ErrorCode::CheckoutFailed)
                })?;
            db::users::set_stripe_customer(&state.pool, &user.id, &c)
                .await
                .map_err(db_err)?;
            c
        }
    };

    let checkout_url = stripe::create_checkout_session(
        &state.stripe_secret_key,
        &customer_id,
        &price_id,
        req.package_type,
        &user.id,
        &state.checkout_success_url,
        &state.checkout_cancel_url,
    )
    .await
    .map_err(|e| {
        tracing::error!("Stripe checkout session creation failed: {e}");
        AppError::new(ErrorCode::CheckoutFailed)
    })?;

    tracing::info!(user_id = %user.id, package = req.package_type.as_db(), "Checkout session created");

    Ok(Json(CheckoutResponse { checkout_url }))
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!("DB error during checkout: {e}");
    AppError::new(ErrorCode::InternalError)
}
