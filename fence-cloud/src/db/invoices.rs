use sqlx::PgPool;

#[derive(sqlx::FromRow, serde::Serialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub user_id: String,
    pub license_id: Option<i64>,
    pub net_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub gross_amount_cents: i64,
    pub tax_rate_percent: i32,
    pub currency: String,
    pub status: String,
    pub stripe_payment_ref: Option<String>,
    pub created_at: i64,
}

pub struct CreateInvoice<'a> {
    pub user_id: &'a str,
    pub license_id: Option<i64>,
    pub net_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub gross_amount_cents: i64,
    pub tax_rate_percent: i32,
    pub currency: &'a str,
    pub stripe_payment_ref: Option<&'a str>,
    pub now: i64,
}

/// Insert an invoice; the invoice number is allocated from a DB sequence
/// so it stays gapless-ish and unique across instances.
pub async fn create(pool: &PgPool, inv: &CreateInvoice<'_>) -> Result<Invoice, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO invoices
             (invoice_number, user_id, license_id, net_amount_cents, tax_amount_cents,
              gross_amount_cents, tax_rate_percent, currency, status, stripe_payment_ref,
              created_at)
         VALUES (
             'GF-' || to_char(to_timestamp($9 / 1000.0), 'YYYY') || '-' ||
                 lpad(nextval('invoice_number_seq')::text, 6, '0'),
             $1, $2, $3, $4, $5, $6, $7, 'paid', $8, $9)
         RETURNING *",
    )
    .bind(inv.user_id)
    .bind(inv.license_id)
    .bind(inv.net_amount_cents)
    .bind(inv.tax_amount_cents)
    .bind(inv.gross_amount_cents)
    .bind(inv.tax_rate_percent)
    .bind(inv.currency)
    .bind(inv.stripe_payment_ref)
    .bind(inv.now)
    .fetch_one(pool)
    .await
}

/// Refund webhooks only carry the Stripe payment reference
pub async fn find_by_payment_ref(
    pool: &PgPool,
    payment_ref: &str,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE stripe_payment_ref = $1")
        .bind(payment_ref)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_status(pool: &PgPool, id: i64, status: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE invoices SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
