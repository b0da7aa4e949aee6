use anyhow::{Context, Result};
use axum::Router;
use config::{AppConfig, StoreConfig};
use services::{
    map_service::MapService, map_store::MapStore, memory_store::MemoryMapStore,
    pg_store::PgMapStore,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging setup ---
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting map-manager with config: {:?}", cfg);

    // --- Initialize store ---
    let store: Arc<dyn MapStore> = match &cfg.store {
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store; records are lost on exit");
            Arc::new(MemoryMapStore::new())
        }
        StoreConfig::Postgres {
            database_url,
            service_key,
            max_connections,
        } => {
            let pg = PgMapStore::connect(database_url, service_key, *max_connections)
                .await
                .context("connecting to postgres")?;

            // --- Handle migration mode ---
            if migrate {
                pg.migrate().await.context("running migrations")?;
                tracing::info!("Database migration complete.");
                return Ok(()); // exit after migration
            }
            Arc::new(pg)
        }
    };

    // --- Build router ---
    let service = MapService::new(store, cfg.object_id_len);
    let app: Router = routes::routes::app(service);

    // --- Start server ---
    let listener = bind(&cfg).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn bind(cfg: &AppConfig) -> Result<TcpListener> {
    let addr = cfg.addr();
    match TcpListener::bind(&addr).await {
        Ok(listener) => Ok(listener),
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            Ok(TcpListener::bind(&fallback_addr).await?)
        }
        Err(err) => Err(err).with_context(|| format!("binding {}", addr)),
    }
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
