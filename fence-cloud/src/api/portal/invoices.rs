//! Portal invoice listing and PDF download

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::auth::portal_auth::UserIdentity;
use crate::db;
use crate::pdf::{self, InvoiceDocument};
use crate::state::AppState;

/// GET /api/portal/invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<db::invoices::Invoice>> {
    let invoices = db::invoices::list_for_user(&state.pool, &identity.user_id)
        .await
        .map_err(db_err)?;
    Ok(Json(invoices))
}

/// GET /api/portal/invoices/{id}/pdf
///
/// The receipt is rendered on demand; nothing is stored server-side.
pub async fn invoice_pdf(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let invoice = db::invoices::find_by_id(&state.pool, id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;

    // Foreign invoices look like missing ones
    if invoice.user_id != identity.user_id && !identity.is_admin {
        return Err(AppError::new(ErrorCode::InvoiceNotFound));
    }

    let buyer = db::users::find_by_id(&state.pool, &invoice.user_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;

    let license = match invoice.license_id {
        Some(license_id) => db::licenses::find_by_id(&state.pool, license_id)
            .await
            .map_err(db_err)?,
        None => None,
    };

    let invoice_date = chrono::DateTime::from_timestamp_millis(invoice.created_at)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default();
    let package_name = license
        .as_ref()
        .map(|l| l.package_type.to_uppercase())
        .unwrap_or_else(|| "-".to_string());

    let doc = InvoiceDocument {
        invoice_number: invoice.invoice_number.clone(),
        invoice_date,
        buyer_email: buyer.email,
        package_name,
        license_key: license.map(|l| l.license_key),
        net_amount_cents: invoice.net_amount_cents,
        tax_amount_cents: invoice.tax_amount_cents,
        gross_amount_cents: invoice.gross_amount_cents,
        tax_rate_percent: invoice.tax_rate_percent,
    };

    let bytes = pdf::render_invoice(&doc).map_err(|e| {
        tracing::error!("Invoice PDF rendering failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.pdf\"", invoice.invoice_number),
        ),
    ];

    Ok((headers, bytes).into_response())
}

fn db_err(e: sqlx::Error) -> AppError {
    tracing::error!("DB error in portal invoices: {e}");
    AppError::new(ErrorCode::InternalError)
}
