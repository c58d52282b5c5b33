//! Domain activation / license validation flow
//!
//! The plugin calls this on every validation; the portal's "add domain"
//! button goes through the same path. Quota check and domain insert run in
//! one transaction behind a row lock on the license, so two concurrent
//! activations at the quota boundary cannot both slip through.

use serde::Serialize;
use shared::domain::normalize_domain;
use shared::error::{AppError, ErrorCode};
use shared::license::{FeatureFlags, LicenseStatus, PackageType};
use shared::util::now_millis;
use sqlx::PgPool;

use crate::db;
use crate::db::domains::SiteMeta;
use crate::error::{ServiceError, ServiceResult};

/// License summary returned to the plugin alongside a valid verdict
#[derive(Serialize)]
pub struct LicenseInfo {
    pub license_key: String,
    pub package_type: PackageType,
    pub max_domains: i32,
    pub expires_at: Option<i64>,
    pub registered_domains: Vec<String>,
}

/// Outcome of a successful validation call
#[derive(Serialize)]
pub struct Activation {
    /// True when this call registered the domain (instead of refreshing it)
    pub registered: bool,
    pub features: FeatureFlags,
    pub license: LicenseInfo,
}

/// Validate a license key for a domain, registering the domain when a quota
/// slot is free.
///
/// Every failure maps to a terminal [`AppError`]; there are no retries.
pub async fn validate_and_activate(
    pool: &PgPool,
    key: &str,
    raw_domain: &str,
    meta: &SiteMeta<'_>,
) -> ServiceResult<Activation> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    // 1. Lookup; unknown keys get a generic message, nothing else leaks
    let license = db::licenses::find_by_key_for_update(&mut tx, key)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LicenseNotFound))?;

    let package = license
        .package()
        .ok_or_else(|| db_corrupt("package_type", &license.package_type))?;
    let status = license
        .status()
        .ok_or_else(|| db_corrupt("status", &license.status))?;

    // 2. Non-active statuses carry their own message
    if !status.is_active() {
        return Err(status_error(status).into());
    }

    // 3. Lazy expiry: flip the row on the validation call that observes it
    if is_expired(license.expires_at, now) {
        db::licenses::mark_expired(&mut tx, license.id, now).await?;
        tx.commit().await?;
        return Err(AppError::new(ErrorCode::LicenseExpired).into());
    }

    // 4. Canonical domain form
    let domain = normalize_domain(raw_domain).map_err(ServiceError::App)?;

    // 5. Known domain: refresh last_seen + site metadata
    if db::domains::find(&mut tx, license.id, &domain).await?.is_some() {
        db::domains::touch(&mut tx, license.id, &domain, meta, now).await?;
        let registered_domains = db::domains::list_names(&mut tx, license.id).await?;
        tx.commit().await?;
        return Ok(activation(false, package, &license.license_key, license.expires_at, registered_domains));
    }

    // 6./7. Free slot → register; otherwise quota error
    let current = db::domains::count(&mut tx, license.id).await?;
    if current >= i64::from(license.max_domains) {
        let registered_domains = db::domains::list_names(&mut tx, license.id).await?;
        return Err(quota_error(package, license.max_domains, &registered_domains).into());
    }

    db::domains::insert(&mut tx, license.id, &domain, meta, now).await?;
    let registered_domains = db::domains::list_names(&mut tx, license.id).await?;
    tx.commit().await?;

    tracing::info!(license_key = %license.license_key, domain = %domain, "Domain activated");

    Ok(activation(true, package, &license.license_key, license.expires_at, registered_domains))
}

fn activation(
    registered: bool,
    package: PackageType,
    key: &str,
    expires_at: Option<i64>,
    registered_domains: Vec<String>,
) -> Activation {
    Activation {
        registered,
        features: FeatureFlags::for_package(package),
        license: LicenseInfo {
            license_key: key.to_string(),
            package_type: package,
            max_domains: package.max_domains(),
            expires_at,
            registered_domains,
        },
    }
}

/// A license with no expiry never expires
pub fn is_expired(expires_at: Option<i64>, now: i64) -> bool {
    expires_at.is_some_and(|t| t < now)
}

/// Status-specific rejection for non-active licenses
pub fn status_error(status: LicenseStatus) -> AppError {
    match status {
        LicenseStatus::Suspended => AppError::new(ErrorCode::LicenseSuspended),
        LicenseStatus::Expired => AppError::new(ErrorCode::LicenseExpired),
        LicenseStatus::Cancelled => AppError::new(ErrorCode::LicenseCancelled),
        // Callers only reach this for non-active statuses
        LicenseStatus::Active => AppError::new(ErrorCode::InternalError),
    }
}

/// Quota rejection. SINGLE licenses whose one slot is taken get the stricter
/// "already activated elsewhere" message; everything else gets the generic
/// quota message. Both carry the quota numbers for the plugin UI.
pub fn quota_error(package: PackageType, max_domains: i32, registered: &[String]) -> AppError {
    let code = if package == PackageType::Single && !registered.is_empty() {
        ErrorCode::SingleDomainTaken
    } else {
        ErrorCode::DomainQuotaExceeded
    };
    AppError::new(code)
        .with_detail("max_domains", max_domains)
        .with_detail("registered_domains", serde_json::json!(registered))
}

fn db_corrupt(field: &str, value: &str) -> ServiceError {
    ServiceError::Db(format!("unparseable {field} in licenses row: {value:?}").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        assert!(!is_expired(None, 1_000));
        assert!(!is_expired(Some(2_000), 1_000));
        assert!(is_expired(Some(999), 1_000));
    }

    #[test]
    fn test_status_errors_are_specific() {
        assert_eq!(
            status_error(LicenseStatus::Suspended).code,
            ErrorCode::LicenseSuspended
        );
        assert_eq!(
            status_error(LicenseStatus::Cancelled).code,
            ErrorCode::LicenseCancelled
        );
        assert_eq!(
            status_error(LicenseStatus::Expired).code,
            ErrorCode::LicenseExpired
        );
    }

    #[test]
    fn test_single_slot_taken_message() {
        let err = quota_error(
            PackageType::Single,
            1,
            &["site-a.com".to_string()],
        );
        assert_eq!(err.code, ErrorCode::SingleDomainTaken);
        assert!(err.message.contains("bereits auf einer anderen Domain"));

        let details = err.details.unwrap();
        assert_eq!(details.get("max_domains").unwrap(), 1);
        assert_eq!(
            details.get("registered_domains").unwrap(),
            &serde_json::json!(["site-a.com"])
        );
    }

    #[test]
    fn test_generic_quota_message_for_larger_packages() {
        let registered: Vec<String> = (0..5).map(|i| format!("site-{i}.de")).collect();
        let err = quota_error(PackageType::Freelancer, 5, &registered);
        assert_eq!(err.code, ErrorCode::DomainQuotaExceeded);
    }
}
