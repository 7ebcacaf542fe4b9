use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router over an already connected database.
pub fn app(db: DatabaseConnection) -> Router {
    routes::build_router(ServerState::new(db), build_cors())
}

/// Connect, optionally migrate, and hand back the pool.
pub async fn prepare_database(cfg: &configs::DatabaseConfig) -> Result<DatabaseConnection, StartupError> {
    let db_cfg = models::db::DatabaseConfig::from_settings(cfg);
    let db = models::db::connect_with_config(&db_cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
        info!("database migrations applied");
    }
    Ok(db)
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, db: DatabaseConnection, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(db)).with_graceful_shutdown(shutdown).await
}

/// Public entry: load config, connect, and run the HTTP server until
/// `shutdown` resolves.
pub async fn run<F>(shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    dotenv().ok();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let db = prepare_database(&cfg.database).await?;

    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}: {e}", cfg.server.bind_addr())))?;
    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await?;
    serve(listener, db.clone(), shutdown).await?;

    info!("requests drained, closing database pool");
    if let Err(e) = db.close().await {
        warn!(error = %e, "database pool did not close cleanly");
    }
    Ok(())
}
