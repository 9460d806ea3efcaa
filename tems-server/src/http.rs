/**
 * API HTTP TEMS - Ingestion agents, lecture du store, dashboard
 *
 * ROUTES :
 * - POST /metrics   public : un agent pousse son snapshot → 204 / 400
 * - GET  /api       Basic Auth optionnelle : dump complet hostname → Metric
 * - GET  /web/...   Basic Auth optionnelle : fichiers statiques du dashboard
 * - GET  /          redirection 302 vers /web/
 * - GET  /health    public : "ok"
 *
 * FONCTIONNEMENT :
 * - Le body de /metrics est décodé à la main (pas d'extracteur Json) : les agents
 *   n'envoient pas toujours de Content-Type, et tout JSON invalide doit donner 400.
 * - `last_seen` est écrasé par l'heure serveur, jamais celle de l'agent.
 * - Aucun forward synchrone : le forwarder lit le store de son côté.
 */

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use time::OffsetDateTime;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::require_basic_auth;
use crate::config::TemsConfig;
use crate::models::{Metric, MetricsMap};
use crate::store::MetricStore;

pub const DASHBOARD_PATH: &str = "/web/";

#[derive(Clone)]
pub struct AppState {
    pub store: MetricStore,
    pub cfg: Arc<TemsConfig>,
}

pub fn build_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route("/api", get(get_api))
        .nest_service("/web", ServeDir::new(&app_state.cfg.web_dir))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_basic_auth));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(redirect_to_dashboard))
        .route("/metrics", post(ingest_metric))
        .merge(protected)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

// POST /metrics
async fn ingest_metric(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let mut metric: Metric = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "rejected malformed metric payload");
        (StatusCode::BAD_REQUEST, "bad json")
    })?;

    metric.last_seen = OffsetDateTime::now_utc().unix_timestamp();
    let hostname = metric.hostname.clone();
    app.store.upsert(hostname.clone(), metric);
    debug!(%hostname, hosts = app.store.len(), "metric stored");
    Ok(StatusCode::NO_CONTENT)
}

// GET /api
async fn get_api(State(app): State<AppState>) -> Json<MetricsMap> {
    Json(app.store.snapshot())
}

// GET /
async fn redirect_to_dashboard() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, DASHBOARD_PATH)])
}
