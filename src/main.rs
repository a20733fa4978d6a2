//! StaffDesk API - Employee Management Backend
//!
//! Accounts, departments, attendance, leave and payslips behind JWT auth.
//!
//! STORAGE: with `DATABASE_URL` set the service runs on PostgreSQL and
//! creates its tables on startup. Without it, data lives in memory and is
//! lost on restart.

mod accounts;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod state;

use crate::config::Settings;
use crate::db::{MemoryStore, PgStore};
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before the subscriber reads LOG_FORMAT / RUST_LOG
    let _ = dotenvy::dotenv();
    init_tracing(config::json_logs_from_env());

    info!("🚀 Starting StaffDesk API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let state = match &settings.database {
        Some(db_config) => {
            let store = match PgStore::connect(db_config).await {
                Ok(store) => store,
                Err(e) => {
                    error!("❌ FATAL: Failed to initialize database pool: {}", e);
                    return Err(anyhow::anyhow!("Cannot start server without database connection"));
                }
            };
            info!("✅ Database pool created successfully (TLS: {})", db_config.require_tls);

            store
                .init_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create tables: {}", e))?;
            info!("✅ Database tables initialized");

            AppState::new(Arc::new(store), &settings.auth, settings.store_timeout)
        }
        None => {
            warn!("⚠️  DATABASE_URL not set, using in-memory store (data is lost on restart)");
            AppState::new(
                Arc::new(MemoryStore::new()),
                &settings.auth,
                settings.store_timeout,
            )
        }
    };
    let state = Arc::new(state);

    if let Some(seed) = &settings.seed_admin {
        accounts::seed_admin(&state, seed)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed admin account: {}", e))?;
    }

    // Build the router
    let app = create_router(state, &settings.cors);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Authentication ───");
    info!("   POST /api/auth/register           - Register new account");
    info!("   POST /api/auth/login              - Login with email/password");
    info!("   GET  /api/auth/me                 - Get current account");
    info!("   GET  /api/auth/verify             - Verify token");
    info!("");
    info!("   ─── Employee ───");
    info!("   GET  /api/employee                - List employees (Admin only)");
    info!("   PUT  /api/employee/{{id}}           - Assign department/position (Admin only)");
    info!("   GET  /api/employee/profile        - Get own profile");
    info!("   PUT  /api/employee/profile        - Update own profile");
    info!("   GET  /api/employee/attendance     - Recent attendance");
    info!("   GET  /api/employee/attendance/today - Today's status");
    info!("   POST /api/employee/attendance/mark  - Mark attendance");
    info!("   GET  /api/employee/leaves         - Own leave requests");
    info!("   POST /api/employee/leaves         - Apply for leave");
    info!("   GET  /api/employee/payslips       - Own payslips");
    info!("");
    info!("   ─── Administration ───");
    info!("   GET  /api/department              - List departments");
    info!("   POST /api/department              - Create department (Admin only)");
    info!("   PUT  /api/department/{{id}}         - Update department (Admin only)");
    info!("   DELETE /api/department/{{id}}       - Delete department (Admin only)");
    info!("   PUT  /api/leaves/{{id}}/status      - Approve/reject leave (Admin only)");
    info!("   POST /api/payslips                - Generate payslip (Admin only)");
    info!("   PUT  /api/payslips/{{id}}/paid      - Mark payslip paid (Admin only)");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,staffdesk_api=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
