mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod rest;
mod transfer;
mod validate;

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{auth::JwtKeys, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub keys: Arc<JwtKeys>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "bank=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    auth::prepare_login_decoy();

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let app_state = AppState {
        db: pool,
        keys: Arc::new(JwtKeys::new(config.jwt_secret.as_bytes())),
    };

    let rest_app = rest::router(app_state);
    let rest_addr = config.listen_addr();
    tracing::info!("REST API listening on {}", rest_addr);
    let rest_listener = tokio::net::TcpListener::bind(&rest_addr).await?;

    axum::serve(rest_listener, rest_app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
