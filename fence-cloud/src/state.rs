//! Application state shared across request handlers

use aws_sdk_sesv2::Client as SesClient;
use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// AWS SES client for transactional emails
    pub ses: SesClient,
    /// SES sender email address
    pub ses_from_email: String,
    /// JWT secret for portal/admin authentication
    pub jwt_secret: String,
    /// HMAC secret for form-guard tokens
    pub guard_secret: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe Price IDs per paid package
    pub stripe_single_price_id: String,
    pub stripe_freelancer_price_id: String,
    pub stripe_agency_price_id: String,
    /// Checkout redirect URLs
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    /// Portal base URL (password-set links, invoice downloads)
    pub portal_base_url: String,
    /// Rate limiter for login/checkout/token routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };

        Ok(Self {
            pool,
            ses,
            ses_from_email: config.ses_from_email.clone(),
            jwt_secret: config.jwt_secret.clone(),
            guard_secret: config.guard_secret.clone(),
            stripe_secret_key: config.stripe_secret_key.clone(),
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            stripe_single_price_id: config.stripe_single_price_id.clone(),
            stripe_freelancer_price_id: config.stripe_freelancer_price_id.clone(),
            stripe_agency_price_id: config.stripe_agency_price_id.clone(),
            checkout_success_url: config.checkout_success_url.clone(),
            checkout_cancel_url: config.checkout_cancel_url.clone(),
            portal_base_url: config.portal_base_url.clone(),
            rate_limiter: RateLimiter::new(),
        })
    }
}
