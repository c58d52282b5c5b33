//! API routes for fence-cloud

pub mod admin;
pub mod checkout;
pub mod guard;
pub mod health;
pub mod portal;
pub mod stripe_webhook;
pub mod validate;

use axum::routing::{delete, get, post};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::portal_auth::{admin_gate_middleware, portal_auth_middleware};
use crate::auth::rate_limit;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, shared::error::AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Plugin-facing API: the license key is the credential
    let plugin = Router::new()
        .route("/api/v1/validate", post(validate::validate))
        .route("/api/v1/guard/token", post(guard::issue_token))
        .route("/api/v1/guard/report", post(guard::report));

    // Checkout (public, rate limited)
    let checkout = Router::new()
        .route("/api/checkout", post(checkout::create_checkout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::checkout_rate_limit,
        ));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    // Portal credential routes (rate limited, no JWT yet)
    let portal_login = Router::new()
        .route("/api/portal/login", post(portal::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::login_rate_limit,
        ));
    let portal_tokens = Router::new()
        .route("/api/portal/set-password", post(portal::set_password))
        .route("/api/portal/forgot-password", post(portal::forgot_password))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::token_rate_limit,
        ));

    // Portal (JWT authenticated)
    let portal = Router::new()
        .route("/api/portal/licenses", get(portal::list_licenses))
        .route(
            "/api/portal/licenses/{key}/domains",
            get(portal::list_domains).post(portal::add_domain),
        )
        .route(
            "/api/portal/licenses/{key}/domains/{domain}",
            delete(portal::remove_domain),
        )
        .route("/api/portal/invoices", get(portal::list_invoices))
        .route("/api/portal/invoices/{id}/pdf", get(portal::invoice_pdf))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            portal_auth_middleware,
        ));

    // Admin (JWT + admin flag); the auth layer must run first, so it is
    // added last (outermost)
    let admin = Router::new()
        .route(
            "/api/admin/licenses",
            post(admin::create_license).get(admin::list_licenses),
        )
        .route("/api/admin/licenses/{key}", delete(admin::delete_license))
        .route(
            "/api/admin/licenses/{key}/status",
            post(admin::set_license_status),
        )
        .route(
            "/api/admin/telemetry/overview",
            get(admin::telemetry_overview),
        )
        .layer(middleware::from_fn(admin_gate_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            portal_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(plugin)
        .merge(checkout)
        .merge(webhook)
        .merge(portal_login)
        .merge(portal_tokens)
        .merge(portal)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
