use sqlx::PgPool;

#[derive(sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub hashed_password: Option<String>,
    pub is_admin: bool,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: i64,
}

impl User {
    /// Shadow accounts were created by webhook/admin and have no usable
    /// password until the token-based set-password flow completes.
    pub fn is_shadow(&self) -> bool {
        self.status == "shadow" || self.hashed_password.is_none()
    }
}

/// Create a regular account with a password
pub async fn create(
    pool: &PgPool,
    id: &str,
    email: &str,
    hashed_password: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, hashed_password, status, created_at)
         VALUES ($1, $2, $3, 'active', $4)",
    )
    .bind(id)
    .bind(email)
    .bind(hashed_password)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Create a shadow account (no password yet)
pub async fn create_shadow(
    pool: &PgPool,
    id: &str,
    email: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, status, created_at)
         VALUES ($1, $2, 'shadow', $3)",
    )
    .bind(id)
    .bind(email)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_stripe_customer(
    pool: &PgPool,
    customer_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE stripe_customer_id = $1")
        .bind(customer_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_stripe_customer(
    pool: &PgPool,
    user_id: &str,
    stripe_customer_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET stripe_customer_id = $1 WHERE id = $2")
        .bind(stripe_customer_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Set a password and activate the account (ends shadow state)
pub async fn set_password(
    pool: &PgPool,
    user_id: &str,
    hashed_password: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1, status = 'active' WHERE id = $2")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Find a user by email and verify the password.
///
/// Shadow accounts cannot authenticate until a password is set.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<User>, sqlx::Error> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    let Some(user) = user else {
        return Ok(None);
    };

    let Some(ref hash) = user.hashed_password else {
        return Ok(None);
    };

    if user.status != "active" {
        return Ok(None);
    }

    if crate::util::verify_password(password, hash) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}
