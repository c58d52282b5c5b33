//! Server configuration, loaded from environment variables

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for portal/admin authentication
    pub jwt_secret: String,
    /// HMAC secret for form-guard tokens (distinct from JWT secret)
    pub guard_secret: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe Price IDs per paid package
    pub stripe_single_price_id: String,
    pub stripe_freelancer_price_id: String,
    pub stripe_agency_price_id: String,
    /// URL to redirect after successful checkout
    pub checkout_success_url: String,
    /// URL to redirect after cancelled checkout
    pub checkout_cancel_url: String,
    /// SES sender email address
    pub ses_from_email: String,
    /// Portal base URL (password-set links, invoice downloads)
    pub portal_base_url: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            guard_secret: Self::require_secret("GUARD_SECRET", &environment)?,
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            stripe_single_price_id: std::env::var("STRIPE_SINGLE_PRICE_ID")
                .unwrap_or_else(|_| "price_single_dev".into()),
            stripe_freelancer_price_id: std::env::var("STRIPE_FREELANCER_PRICE_ID")
                .unwrap_or_else(|_| "price_freelancer_dev".into()),
            stripe_agency_price_id: std::env::var("STRIPE_AGENCY_PRICE_ID")
                .unwrap_or_else(|_| "price_agency_dev".into()),
            checkout_success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "https://germanfence.de/kauf/danke".into()),
            checkout_cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "https://germanfence.de/kauf/abgebrochen".into()),
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@germanfence.de".into()),
            portal_base_url: std::env::var("PORTAL_BASE_URL")
                .unwrap_or_else(|_| "https://portal.germanfence.de".into()),
            environment,
        })
    }
}
