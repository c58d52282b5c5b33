use sqlx::PgPool;

#[derive(sqlx::FromRow)]
pub struct PasswordToken {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: i64,
    pub used_at: Option<i64>,
    pub created_at: i64,
}

/// Token lifetime: 48 hours
pub const TOKEN_TTL_MS: i64 = 48 * 60 * 60 * 1000;

pub async fn create(
    pool: &PgPool,
    token_hash: &str,
    user_id: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO password_tokens (token_hash, user_id, expires_at, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(now + TOKEN_TTL_MS)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, token_hash: &str) -> Result<Option<PasswordToken>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM password_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .fetch_optional(pool)
        .await
}

/// Mark a token consumed; returns false when it was already used
/// (first-use-wins under concurrent requests).
pub async fn consume(pool: &PgPool, token_hash: &str, now: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE password_tokens SET used_at = $1 WHERE token_hash = $2 AND used_at IS NULL",
    )
    .bind(now)
    .bind(token_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
