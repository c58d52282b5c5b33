use sqlx::{PgConnection, PgPool};

#[derive(sqlx::FromRow, serde::Serialize)]
pub struct LicenseDomain {
    pub id: i64,
    pub license_id: i64,
    pub domain: String,
    pub site_title: Option<String>,
    pub wp_version: Option<String>,
    pub php_version: Option<String>,
    pub activated_at: i64,
    pub last_seen_at: i64,
}

/// Site metadata reported by the plugin on validation calls
#[derive(Default)]
pub struct SiteMeta<'a> {
    pub site_title: Option<&'a str>,
    pub wp_version: Option<&'a str>,
    pub php_version: Option<&'a str>,
}

pub async fn list_for_license(
    pool: &PgPool,
    license_id: i64,
) -> Result<Vec<LicenseDomain>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM license_domains WHERE license_id = $1 ORDER BY activated_at ASC",
    )
    .bind(license_id)
    .fetch_all(pool)
    .await
}

pub async fn list_names(conn: &mut PgConnection, license_id: i64) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT domain FROM license_domains WHERE license_id = $1 ORDER BY activated_at ASC",
    )
    .bind(license_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}

pub async fn find(
    conn: &mut PgConnection,
    license_id: i64,
    domain: &str,
) -> Result<Option<LicenseDomain>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM license_domains WHERE license_id = $1 AND domain = $2")
        .bind(license_id)
        .bind(domain)
        .fetch_optional(conn)
        .await
}

pub async fn count(conn: &mut PgConnection, license_id: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM license_domains WHERE license_id = $1")
            .bind(license_id)
            .fetch_one(conn)
            .await?;
    Ok(n)
}

pub async fn insert(
    conn: &mut PgConnection,
    license_id: i64,
    domain: &str,
    meta: &SiteMeta<'_>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO license_domains
             (license_id, domain, site_title, wp_version, php_version,
              activated_at, last_seen_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)",
    )
    .bind(license_id)
    .bind(domain)
    .bind(meta.site_title)
    .bind(meta.wp_version)
    .bind(meta.php_version)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Refresh last_seen_at and whatever site metadata the plugin reported
pub async fn touch(
    conn: &mut PgConnection,
    license_id: i64,
    domain: &str,
    meta: &SiteMeta<'_>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE license_domains SET
             last_seen_at = $1,
             site_title = COALESCE($2, site_title),
             wp_version = COALESCE($3, wp_version),
             php_version = COALESCE($4, php_version)
         WHERE license_id = $5 AND domain = $6",
    )
    .bind(now)
    .bind(meta.site_title)
    .bind(meta.wp_version)
    .bind(meta.php_version)
    .bind(license_id)
    .bind(domain)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, license_id: i64, domain: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM license_domains WHERE license_id = $1 AND domain = $2")
        .bind(license_id)
        .bind(domain)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
