use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use sweetshop_api::auth::AppStateInner;
use sweetshop_server::{app, seed};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweetshop=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("SWEETSHOP_JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: SWEETSHOP_JWT_SECRET is unset or still a placeholder.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let db_path = std::env::var("SWEETSHOP_DB_PATH").unwrap_or_else(|_| "sweetshop.db".into());
    let host = std::env::var("SWEETSHOP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SWEETSHOP_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let allowed_origins: Vec<String> = std::env::var("SWEETSHOP_ALLOWED_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    // Init database
    let db = sweetshop_db::Database::open(&PathBuf::from(&db_path))?;

    // Provision the admin account if configured
    if let Some(admin) = seed::admin_from_env() {
        seed::ensure_admin(&db, &admin)?;
    }

    // Shared state
    let state = Arc::new(AppStateInner { db, jwt_secret });

    let app = app::router(state, &allowed_origins);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Sweet Shop server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
