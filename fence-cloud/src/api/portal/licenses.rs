//! Portal license + domain management

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::domain::normalize_domain;
use shared::error::{AppError, ErrorCode};

use super::find_owned_license;
use crate::api::ApiResult;
use crate::auth::portal_auth::UserIdentity;
use crate::db;
use crate::db::domains::SiteMeta;
use crate::licensing::activation::{self, Activation};
use crate::state::AppState;

#[derive(Serialize)]
pub struct LicenseView {
    pub license_key: String,
    pub package_type: String,
    pub status: String,
    pub max_domains: i32,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

impl From<db::licenses::License> for LicenseView {
    fn from(l: db::licenses::License) -> Self {
        Self {
            license_key: l.license_key,
            package_type: l.package_type,
            status: l.status,
            max_domains: l.max_domains,
            expires_at: l.expires_at,
            created_at: l.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ListLicensesQuery {
    /// Admin only: inspect another user's licenses
    pub user_id: Option<String>,
}

/// GET /api/portal/licenses
pub async fn list_licenses(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<ListLicensesQuery>,
) -> ApiResult<Vec<LicenseView>> {
    let user_id = match query.user_id {
        Some(ref other) if identity.is_admin => other.as_str(),
        Some(_) => return Err(AppError::new(ErrorCode::PermissionDenied)),
        None => identity.user_id.as_str(),
    };

    let licenses = db::licenses::list_by_user(&state.pool, user_id)
        .await
        .map_err(db_err)?;

    Ok(Json(licenses.into_iter().map(LicenseView::from).collect()))
}

/// GET /api/portal/licenses/{key}/domains
pub async fn list_domains(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(key): Path<String>,
) -> ApiResult<Vec<db::domains::LicenseDomain>> {
    let license = find_owned_license(&state, &key, &identity).await?;
    let domains = db::domains::list_for_license(&state.pool, license.id)
        .await
        .map_err(db_err)?;
    Ok(Json(domains))
}

#[derive(Deserialize)]
pub struct AddDomainRequest {
    pub domain: String,
}

/// POST /api/portal/licenses/{key}/domains
///
/// Goes through the same transactional activation path the plugin uses, so
/// quota rules cannot diverge between the two entry points.
pub async fn add_domain(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(key): Path<String>,
    Json(req): Json<AddDomainRequest>,
) -> ApiResult<Activation> {
    find_owned_license(&state, &key, &identity).await?;

    let result =
        activation::validate_and_activate(&state.pool, &key, &req.domain, &SiteMeta::default())
            .await
            .map_err(AppError::from)?;

    Ok(Json(result))
}

/// DELETE /api/portal/licenses/{key}/domains/{domain}
pub async fn remove_domain(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((key, domain)): Path<(String, String)>,
) -> ApiResult<serde_json::Value> {
    let license = find_owned_license(&state, &key, &identity).await?;
    let domain = normalize_domain(&domain)?;

    let removed = db::domains::delete(&state.pool, license.id, &domain)
        .await
        .map_err(db_err)?;
    if !removed {
        return Err(AppError::new(ErrorCode::DomainNotRegistered));
    }

    tracing::info!(license_key = %key, domain = %domain, "Domain removed");

    Ok(Json(serde_json::json!({ "message": "Domain entfernt" })))
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!("DB error in portal licenses: {e}");
    AppError::new(ErrorCode::InternalError)
}
