//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::{ProvisionAccountInput, ProvisionAccountUseCase};
use auth::config::AuthConfig;
use auth::infra::mail::LogMailer;
use auth::models::account_role::AccountRole;
use auth::models::email::Email;
use auth::{PgAuthStore, admin_router, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration from environment
    let config = Arc::new(build_auth_config()?);

    let store = Arc::new(PgAuthStore::new(pool.clone()));
    let mailer = Arc::new(LogMailer);

    // Startup cleanup: remove expired OTP and stale throttle records.
    // Errors here should not prevent server startup.
    if let Err(e) = store.cleanup_expired().await {
        tracing::warn!(error = %e, "Auth record cleanup failed, continuing anyway");
    }

    // Seed the administrator account if configured and absent
    if let Err(e) = seed_admin(&store).await {
        tracing::warn!(error = %e, "Admin seeding failed, continuing anyway");
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(store.clone(), mailer.clone(), config.clone()),
        )
        .nest(
            "/api/admin",
            admin_router(store.clone(), mailer.clone(), config.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Build the auth configuration from the environment
///
/// The signing secret is mandatory outside debug builds and is never
/// logged.
fn build_auth_config() -> anyhow::Result<AuthConfig> {
    let config = if cfg!(debug_assertions) && env::var("SESSION_TOKEN_SECRET").is_err() {
        tracing::warn!("SESSION_TOKEN_SECRET not set, using a random development secret");
        AuthConfig::development()
    } else {
        let secret = env::var("SESSION_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_TOKEN_SECRET must be set in production"))?;
        if secret.len() < auth::config::MIN_TOKEN_SECRET_LENGTH {
            anyhow::bail!(
                "SESSION_TOKEN_SECRET must be at least {} bytes",
                auth::config::MIN_TOKEN_SECRET_LENGTH
            );
        }

        let mail_soft_fail = env::var("MAIL_SOFT_FAIL")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if mail_soft_fail {
            tracing::warn!("MAIL_SOFT_FAIL enabled: OTP dispatch failures will NOT block logins");
        }

        AuthConfig {
            token_secret: secret.into_bytes(),
            mail_soft_fail,
            ..AuthConfig::default()
        }
    };

    Ok(config)
}

/// Create the administrator account from seed credentials when absent
async fn seed_admin(store: &Arc<PgAuthStore>) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) else {
        return Ok(());
    };

    use auth::domain::repository::AccountStore;
    let normalized = Email::new(&email).map_err(|e| anyhow::anyhow!("ADMIN_EMAIL: {e}"))?;
    if AccountStore::find_by_email(store.as_ref(), &normalized)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let use_case = ProvisionAccountUseCase::new(store.clone());
    let output = use_case
        .execute(ProvisionAccountInput {
            email,
            name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            password: Some(password),
            role: AccountRole::Admin,
        })
        .await?;

    tracing::info!(account_id = %output.account_id, "Seeded administrator account");
    Ok(())
}
