//! Form-guard endpoints (plugin-facing)
//!
//! POST /api/v1/guard/token  — token the plugin stamps into rendered forms
//! POST /api/v1/guard/report — submission signals in, verdict out

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::license::LicenseStatus;

use super::ApiResult;
use crate::db;
use crate::guard::heuristics::{self, BlockMethod, SubmissionSignals, Verdict};
use crate::guard::token;
use crate::licensing::activation;
use crate::state::AppState;
use crate::util::now_millis;

#[derive(Deserialize)]
pub struct TokenRequest {
    pub license_key: String,
    pub form_id: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub max_age_ms: i64,
}

pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<TokenResponse> {
    let license = db::licenses::find_by_key(&state.pool, &req.license_key)
        .await
        .map_err(|e| {
            tracing::error!("DB error during guard token issue: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::LicenseNotFound))?;

    let now = now_millis();
    if license.status() != Some(LicenseStatus::Active)
        || activation::is_expired(license.expires_at, now)
    {
        return Err(AppError::new(ErrorCode::LicenseExpired));
    }

    Ok(Json(TokenResponse {
        token: token::issue(&state.guard_secret, &req.form_id, now),
        max_age_ms: token::MAX_AGE_MS,
    }))
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub license_key: String,
    pub domain: String,
    pub form_id: String,
    pub token: String,
    pub signals: SubmissionSignals,
    #[serde(default)]
    pub country: Option<String>,
}

/// Screen a submission and return the verdict.
///
/// A missing or stale token is itself a block signal (scrapers replay forms),
/// not an HTTP error. Telemetry ingestion is best-effort; the verdict is
/// returned regardless.
pub async fn report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Json<Verdict> {
    let now = now_millis();

    let verdict = if !token::verify(&state.guard_secret, &req.form_id, &req.token, now) {
        Verdict {
            blocked: true,
            method: Some(BlockMethod::Token),
        }
    } else {
        heuristics::evaluate(&req.signals)
    };

    if let Some(method) = verdict.method {
        let license_id = db::licenses::find_by_key(&state.pool, &req.license_key)
            .await
            .ok()
            .flatten()
            .map(|l| l.id);
        let domain = shared::domain::normalize_domain(&req.domain)
            .unwrap_or_else(|_| req.domain.clone());

        if let Err(e) = db::telemetry::insert(
            &state.pool,
            license_id,
            &domain,
            method.as_str(),
            req.country.as_deref(),
            now,
        )
        .await
        {
            tracing::warn!("Telemetry insert failed: {e}");
        }
    }

    Json(verdict)
}
