//! Admin license management

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::license::{LicenseStatus, PackageType};

use crate::api::ApiResult;
use crate::db;
use crate::licensing::keygen;
use crate::state::AppState;
use crate::util::{generate_token, now_millis, token_digest};
use crate::email;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Deserialize)]
pub struct CreateLicenseRequest {
    /// Existing user id, or…
    pub user_id: Option<String>,
    /// …an email; unknown addresses get a shadow account + invitation mail
    pub email: Option<String>,
    pub package_type: PackageType,
    /// Override the default term (365 days paid, unlimited free)
    pub valid_days: Option<i64>,
}

#[derive(Serialize)]
pub struct CreateLicenseResponse {
    pub license_key: String,
    pub user_id: String,
    pub expires_at: Option<i64>,
}

/// POST /api/admin/licenses
pub async fn create_license(
    State(state): State<AppState>,
    Json(req): Json<CreateLicenseRequest>,
) -> ApiResult<CreateLicenseResponse> {
    let now = now_millis();

    let user = match (req.user_id, req.email) {
        (Some(id), _) => db::users::find_by_id(&state.pool, &id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::not_found("Benutzer"))?,
        (None, Some(email)) => {
            let email = email.trim().to_lowercase();
            match db::users::find_by_email(&state.pool, &email).await.map_err(db_err)? {
                Some(u) => u,
                None => {
                    let id = uuid::Uuid::new_v4().to_string();
                    db::users::create_shadow(&state.pool, &id, &email, now)
                        .await
                        .map_err(db_err)?;

                    // Invitation: the new account needs a password to log in
                    let token = generate_token();
                    if db::password_tokens::create(&state.pool, &token_digest(&token), &id, now)
                        .await
                        .is_ok()
                    {
                        let url = format!("{}/passwort?token={token}", state.portal_base_url);
                        let _ = email::send_password_token(
                            &state.ses,
                            &state.ses_from_email,
                            &email,
                            &url,
                        )
                        .await;
                    }

                    db::users::find_by_id(&state.pool, &id)
                        .await
                        .map_err(db_err)?
                        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?
                }
            }
        }
        (None, None) => {
            return Err(AppError::invalid_request("user_id oder email erforderlich"));
        }
    };

    let expires_at = match req.valid_days {
        Some(days) if days > 0 => Some(now + days * DAY_MS),
        Some(_) => return Err(AppError::validation("valid_days muss positiv sein")),
        None => req.package_type.is_paid().then_some(now + 365 * DAY_MS),
    };

    let license_key = keygen::generate_unique_key(&state.pool, req.package_type)
        .await
        .map_err(AppError::from)?;
    db::licenses::create(
        &state.pool,
        &license_key,
        req.package_type,
        expires_at,
        Some(&user.id),
        now,
    )
    .await
    .map_err(db_err)?;

    tracing::info!(
        license_key = %license_key,
        user_id = %user.id,
        package = req.package_type.as_db(),
        "License created by admin"
    );

    Ok(Json(CreateLicenseResponse {
        license_key,
        user_id: user.id,
        expires_at,
    }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/admin/licenses
pub async fn list_licenses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<db::licenses::LicenseSummary>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let summaries = db::licenses::list_summaries(&state.pool, limit, offset)
        .await
        .map_err(db_err)?;
    Ok(Json(summaries))
}

/// DELETE /api/admin/licenses/{key}
pub async fn delete_license(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<serde_json::Value> {
    let deleted = db::licenses::delete_by_key(&state.pool, &key)
        .await
        .map_err(db_err)?;
    if !deleted {
        return Err(AppError::new(ErrorCode::LicenseNotFound));
    }

    tracing::info!(license_key = %key, "License deleted by admin");

    Ok(Json(serde_json::json!({ "message": "Lizenz gelöscht" })))
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: LicenseStatus,
}

/// POST /api/admin/licenses/{key}/status — suspend/reactivate
pub async fn set_license_status(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<serde_json::Value> {
    let license = db::licenses::find_by_key(&state.pool, &key)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::new(ErrorCode::LicenseNotFound))?;

    let now = now_millis();
    db::licenses::update_status(&state.pool, license.id, req.status, now)
        .await
        .map_err(db_err)?;

    tracing::info!(license_key = %key, status = req.status.as_db(), "License status changed");

    Ok(Json(serde_json::json!({ "status": req.status })))
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!("DB error in admin licenses: {e}");
    AppError::new(ErrorCode::InternalError)
}
