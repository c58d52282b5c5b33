//! fence-cloud — GermanFence licensing and customer-portal backend
//!
//! Long-running service that:
//! - Validates plugin licenses and activates domains against package quotas
//! - Screens form-guard submission reports and ingests block telemetry
//! - Handles Stripe checkout + webhooks (license/invoice fulfillment)
//! - Serves the customer portal and admin API (JWT authenticated)

mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod guard;
mod licensing;
mod pdf;
mod state;
mod stripe;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fence_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting fence-cloud (env: {})", config.environment);

    // Initialize application state (connects Postgres, runs migrations)
    let state = AppState::new(&config).await?;

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("fence-cloud listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
