// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod applications;
mod auth;
mod businesses;
mod common;
mod notifications;
mod policy;
mod posts;
mod storage;
mod users;

#[cfg(test)]
mod test_support;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::{AppConfig, AppState, MailTransportKind};
use notifications::{
    LogTransport, MailTransport, NotificationService, NotificationWorker, SesTransport,
    QUEUE_CAPACITY,
};
use storage::Store;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();

    // Sentry first so the tracing layer has a client to report to
    let _sentry_guard = common::monitoring::init_sentry(&config);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer())
        .init();

    info!(admin_count = config.admin_emails.len(), "Loaded admin emails");

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // NOTIFICATIONS
    // ========================================================================

    let transport: Arc<dyn MailTransport> = match config.mail_transport {
        MailTransportKind::Ses => {
            let from_email = config
                .ses_from_email
                .clone()
                .ok_or_else(|| anyhow::anyhow!("SES_FROM_EMAIL is required for MAIL_TRANSPORT=ses"))?;
            info!("Using SES mail transport");
            Arc::new(SesTransport::new(from_email, config.ses_region.clone()).await)
        }
        MailTransportKind::Log => {
            info!("Using logging mail transport");
            Arc::new(LogTransport)
        }
    };

    let (notification_service, receiver) = NotificationService::new(QUEUE_CAPACITY);
    let worker = NotificationWorker::new(receiver, transport, config.frontend_url.clone()).spawn();

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let http_client = Client::builder().build()?;

    let app_state = AppState {
        store: Store::new(pool),
        config: config.clone(),
        http: http_client,
        notifications: notification_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // USER ROUTES
        // ====================================================================
        .merge(users::users_routes())
        // ====================================================================
        // BUSINESS AND POST ROUTES
        // ====================================================================
        .merge(businesses::businesses_routes())
        .merge(posts::posts_routes())
        // ====================================================================
        // APPLICATION ROUTES
        // ====================================================================
        .merge(applications::applications_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(Extension(shared.clone()))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // the router held the last queue senders; let the worker drain
    drop(shared);
    worker.await?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
