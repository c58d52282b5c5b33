//! Portal authentication endpoints: login, set-password, forgot-password

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::util::{generate_token, hash_password, now_millis, token_digest};
use crate::{auth, email};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

/// POST /api/portal/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();

    // Shadow accounts and wrong passwords both end here; one message only
    let user = db::users::authenticate(&state.pool, &email, &req.password)
        .await
        .map_err(|e| {
            tracing::error!("DB error during login: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    let token =
        auth::portal_auth::create_token(&user.id, &user.email, user.is_admin, &state.jwt_secret)
            .map_err(|e| {
                tracing::error!("JWT creation failed: {e}");
                AppError::new(ErrorCode::InternalError)
            })?;

    tracing::info!(user_id = %user.id, "Portal login");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        email: user.email,
        is_admin: user.is_admin,
    }))
}

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// POST /api/portal/set-password
///
/// Consumes a password token (purchase email or forgot-password flow) and
/// activates shadow accounts.
pub async fn set_password(
    State(state): State<AppState>,
    Json(req): Json<SetPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "Passwort muss mindestens 8 Zeichen lang sein",
        ));
    }

    let now = now_millis();
    let digest = token_digest(req.token.trim());

    let token_row = db::password_tokens::find(&state.pool, &digest)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid))?;

    if token_row.expires_at < now {
        return Err(AppError::new(ErrorCode::TokenExpired));
    }

    // First use wins under concurrent requests
    if !db::password_tokens::consume(&state.pool, &digest, now)
        .await
        .map_err(db_err)?
    {
        return Err(AppError::new(ErrorCode::TokenInvalid));
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    db::users::set_password(&state.pool, &token_row.user_id, &hashed)
        .await
        .map_err(db_err)?;

    tracing::info!(user_id = %token_row.user_id, "Password set, account active");

    Ok(Json(serde_json::json!({ "message": "Passwort gesetzt" })))
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/portal/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    let email_addr = req.email.trim().to_lowercase();

    // Constant response to prevent email enumeration
    let response = serde_json::json!({
        "message": "Falls die E-Mail-Adresse existiert, wurde ein Link verschickt"
    });

    let user = match db::users::find_by_email(&state.pool, &email_addr).await {
        Ok(Some(u)) => u,
        _ => return Ok(Json(response)),
    };

    let token = generate_token();
    let now = now_millis();
    if let Err(e) =
        db::password_tokens::create(&state.pool, &token_digest(&token), &user.id, now).await
    {
        tracing::error!(%e, "Failed to store password token");
        return Ok(Json(response));
    }

    let url = format!("{}/passwort?token={token}", state.portal_base_url);
    let _ = email::send_password_token(&state.ses, &state.ses_from_email, &user.email, &url).await;

    Ok(Json(response))
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!("DB error in portal auth: {e}");
    AppError::new(ErrorCode::InternalError)
}
