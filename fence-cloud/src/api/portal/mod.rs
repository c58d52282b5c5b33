//! Customer portal endpoints — split into sub-modules by domain

mod auth;
mod invoices;
mod licenses;

pub use auth::{forgot_password, login, set_password};
pub use invoices::{invoice_pdf, list_invoices};
pub use licenses::{add_domain, list_domains, list_licenses, remove_domain};

use shared::error::{AppError, ErrorCode};

use crate::auth::portal_auth::UserIdentity;
use crate::db;
use crate::state::AppState;

/// Fetch a license the caller may act on: its owner, or any admin.
///
/// Foreign keys get the same "not found" as unknown keys so the portal
/// cannot be used to probe which keys exist.
pub async fn find_owned_license(
    state: &AppState,
    key: &str,
    identity: &UserIdentity,
) -> Result<db::licenses::License, AppError> {
    let license = db::licenses::find_by_key(&state.pool, key)
        .await
        .map_err(|e| {
            tracing::error!("DB error loading license: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::LicenseNotFound))?;

    let owned = license.user_id.as_deref() == Some(identity.user_id.as_str());
    if !owned && !identity.is_admin {
        return Err(AppError::new(ErrorCode::LicenseNotFound));
    }

    Ok(license)
}
