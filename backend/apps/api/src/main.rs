//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::application::DisabledSms;
use auth::{AuthConfig, PgAuthRepository};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
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
    let database_url = env::var("DATABASE_URL")?;

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

    // Auth configuration
    let config = if cfg!(debug_assertions) {
        let mut config = AuthConfig::development();
        config.debug_otp = env::var("DEBUG_OTP").map(|v| v == "1" || v == "true").unwrap_or(true);
        config
    } else {
        // In production, secrets come from the environment
        let jwt_secret = env::var("JWT_SECRET")?;
        let secret_b64 = env::var("AUTH_SECRET_KEY")?;
        let secret_key = decode_secret_key(&secret_b64)?;
        AuthConfig {
            jwt_secret,
            secret_key,
            ..AuthConfig::default()
        }
    };

    let repo = Arc::new(PgAuthRepository::new(pool.clone(), config.secret_key));
    let sms = Arc::new(DisabledSms);
    let config = Arc::new(config);

    // Startup cleanup: remove expired OTP codes
    // Errors here should not prevent server startup
    {
        use auth::domain::repository::OtpRepository;
        if let Err(e) = repo.delete_expired().await {
            tracing::warn!(error = %e, "OTP cleanup failed, continuing anyway");
        }
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/api/health", get(health))
        .nest(
            "/api/auth",
            auth::auth_router(repo.clone(), sms.clone(), config.clone()),
        )
        .nest("/api/admin", auth::admin_router(repo, sms, config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Decode the base64 sealing key, rejecting anything that is not 32 bytes
fn decode_secret_key(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let secret_bytes = Engine::decode(&general_purpose::STANDARD, secret_b64)?;
    let secret_key: [u8; 32] = secret_bytes
        .as_slice()
        .try_into()
        .context("AUTH_SECRET_KEY must decode to exactly 32 bytes")?;
    Ok(secret_key)
}
