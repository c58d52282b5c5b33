use shared::license::{LicenseStatus, PackageType};
use sqlx::{PgConnection, PgPool};

#[derive(sqlx::FromRow)]
pub struct License {
    pub id: i64,
    pub license_key: String,
    pub package_type: String,
    pub max_domains: i32,
    pub status: String,
    pub expires_at: Option<i64>,
    pub user_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl License {
    pub fn package(&self) -> Option<PackageType> {
        PackageType::from_db(&self.package_type)
    }

    pub fn status(&self) -> Option<LicenseStatus> {
        LicenseStatus::from_db(&self.status)
    }
}

pub async fn create(
    pool: &PgPool,
    license_key: &str,
    package: PackageType,
    expires_at: Option<i64>,
    user_id: Option<&str>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO licenses
             (license_key, package_type, max_domains, status, expires_at, user_id,
              created_at, updated_at)
         VALUES ($1, $2, $3, 'active', $4, $5, $6, $6)
         RETURNING id",
    )
    .bind(license_key)
    .bind(package.as_db())
    .bind(package.max_domains())
    .bind(expires_at)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<License>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM licenses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<License>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM licenses WHERE license_key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Lock the license row for the rest of the transaction.
///
/// Activation runs its quota check and domain insert behind this lock so
/// concurrent calls for the same license cannot over-allocate.
pub async fn find_by_key_for_update(
    conn: &mut PgConnection,
    key: &str,
) -> Result<Option<License>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM licenses WHERE license_key = $1 FOR UPDATE")
        .bind(key)
        .fetch_optional(conn)
        .await
}

pub async fn key_exists(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM licenses WHERE license_key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Lazy expiry transition, performed when a validation call observes
/// `expires_at` in the past.
pub async fn mark_expired(
    conn: &mut PgConnection,
    license_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE licenses SET status = 'expired', updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(license_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_status(
    pool: &PgPool,
    license_id: i64,
    status: LicenseStatus,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE licenses SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_db())
        .bind(now)
        .bind(license_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Hard delete — admin action only
pub async fn delete_by_key(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM licenses WHERE license_key = $1")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<License>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM licenses WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Admin list entry with the active domain count joined in
#[derive(sqlx::FromRow, serde::Serialize)]
pub struct LicenseSummary {
    pub license_key: String,
    pub package_type: String,
    pub max_domains: i32,
    pub status: String,
    pub expires_at: Option<i64>,
    pub user_id: Option<String>,
    pub domain_count: i64,
    pub created_at: i64,
}

pub async fn list_summaries(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<LicenseSummary>, sqlx::Error> {
    sqlx::query_as(
        "SELECT l.license_key, l.package_type, l.max_domains, l.status, l.expires_at,
                l.user_id, l.created_at,
                COUNT(d.id) AS domain_count
         FROM licenses l
         LEFT JOIN license_domains d ON d.license_id = l.id
         GROUP BY l.id
         ORDER BY l.created_at DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
