/**
 * TEMS SERVER - Point d'entrée du service d'agrégation de télémétrie
 *
 * RÔLE : Bootstrap : logs, config (fatale si invalide), store mémoire,
 * forwarder TEPS en tâche de fond, serveur HTTP Axum, arrêt propre sur Ctrl-C.
 *
 * ARCHITECTURE : agents → POST /metrics → MetricStore ← forwarder → TEPS
 *                                            ↑
 *                                 GET /api, dashboard /web/
 */

mod auth;
mod config;
mod forwarder;
mod http;
mod models;
mod store;

use crate::config::{config_path, load_config};
use crate::forwarder::Forwarder;
use crate::http::AppState;
use crate::store::MetricStore;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = config_path();
    let cfg = load_config(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let cfg = Arc::new(cfg);

    let store = MetricStore::new();

    // forwarder TEPS, arrêté via le canal de shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let forwarder = Forwarder::new(&cfg, store.clone()).context("failed to build TEPS client")?;
    let forwarder_task = forwarder.spawn(shutdown_rx);

    let app = http::build_router(AppState { store, cfg: cfg.clone() });

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "TEMS {} ready on http://{} | /metrics (agents) | /web/ (dashboard) -> TEPS {}",
        cfg.tems_name, addr, cfg.teps_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = forwarder_task.await {
        warn!(error = %e, "forwarder task ended abnormally");
    }
    info!("TEMS stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
