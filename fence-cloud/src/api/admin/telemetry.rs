//! Telemetry dashboard aggregation

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::db::telemetry::{self, Bucket};
use crate::state::AppState;
use crate::util::now_millis;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Deserialize)]
pub struct OverviewQuery {
    /// Window start (ms); defaults to 30 days ago
    pub from: Option<i64>,
    /// Window end (ms, exclusive); defaults to now
    pub to: Option<i64>,
}

#[derive(Serialize)]
pub struct TelemetryOverview {
    pub from: i64,
    pub to: i64,
    pub total_blocked: i64,
    pub by_method: Vec<Bucket>,
    pub by_country: Vec<Bucket>,
    pub by_hour: Vec<Bucket>,
    pub by_weekday: Vec<Bucket>,
}

/// GET /api/admin/telemetry/overview
pub async fn telemetry_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> ApiResult<TelemetryOverview> {
    let now = now_millis();
    let to = query.to.unwrap_or(now);
    let from = query.from.unwrap_or(to - 30 * DAY_MS);
    if from >= to {
        return Err(AppError::validation("from muss vor to liegen"));
    }

    let pool = &state.pool;
    let overview = TelemetryOverview {
        from,
        to,
        total_blocked: telemetry::total_blocked(pool, from, to).await.map_err(db_err)?,
        by_method: telemetry::by_method(pool, from, to).await.map_err(db_err)?,
        by_country: telemetry::by_country(pool, from, to).await.map_err(db_err)?,
        by_hour: telemetry::by_hour(pool, from, to).await.map_err(db_err)?,
        by_weekday: telemetry::by_weekday(pool, from, to).await.map_err(db_err)?,
    };

    Ok(Json(overview))
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!("DB error in telemetry overview: {e}");
    AppError::new(ErrorCode::DatabaseError)
}
