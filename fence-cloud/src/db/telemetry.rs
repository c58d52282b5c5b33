//! Append-only telemetry log and its dashboard aggregations

use sqlx::PgPool;

/// Record a blocked submission. Ingestion is best-effort; callers swallow
/// failures so the guard verdict still reaches the plugin.
pub async fn insert(
    pool: &PgPool,
    license_id: Option<i64>,
    domain: &str,
    method: &str,
    country: Option<&str>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO telemetry_events (license_id, domain, method, country, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(license_id)
    .bind(domain)
    .bind(method)
    .bind(country)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// One group-by bucket: a label (method, country, hour, weekday) and its count
#[derive(sqlx::FromRow, serde::Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: i64,
}

pub async fn total_blocked(pool: &PgPool, from: i64, to: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM telemetry_events WHERE created_at >= $1 AND created_at < $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn by_method(pool: &PgPool, from: i64, to: i64) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        "SELECT method AS label, COUNT(*) AS count
         FROM telemetry_events
         WHERE created_at >= $1 AND created_at < $2
         GROUP BY method
         ORDER BY count DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

pub async fn by_country(pool: &PgPool, from: i64, to: i64) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        "SELECT COALESCE(country, 'unbekannt') AS label, COUNT(*) AS count
         FROM telemetry_events
         WHERE created_at >= $1 AND created_at < $2
         GROUP BY country
         ORDER BY count DESC
         LIMIT 10",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Hour-of-day histogram (UTC), labels "0".."23"
pub async fn by_hour(pool: &PgPool, from: i64, to: i64) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        "SELECT h::text AS label, count FROM (
             SELECT EXTRACT(HOUR FROM to_timestamp(created_at / 1000.0) AT TIME ZONE 'UTC')::int AS h,
                    COUNT(*) AS count
             FROM telemetry_events
             WHERE created_at >= $1 AND created_at < $2
             GROUP BY h
         ) t ORDER BY t.h",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Weekday histogram, ISO labels "1" (Monday) .. "7" (Sunday)
pub async fn by_weekday(pool: &PgPool, from: i64, to: i64) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        "SELECT d::text AS label, count FROM (
             SELECT EXTRACT(ISODOW FROM to_timestamp(created_at / 1000.0) AT TIME ZONE 'UTC')::int AS d,
                    COUNT(*) AS count
             FROM telemetry_events
             WHERE created_at >= $1 AND created_at < $2
             GROUP BY d
         ) t ORDER BY t.d",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}
