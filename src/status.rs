use crate::app::AppState;
use crate::storage;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

const ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/daily_report",
    "/daily_report/summary",
    "/games/notebird",
    "/games/notedino",
    "/logs/err",
    "/users/app",
    "/missed",
    "/notes",
    "/labs",
];

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub mode: &'static str,
    pub db_connected: bool,
    pub endpoints: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db: bool,
}

async fn db_ok(state: &AppState) -> bool {
    storage::interact(&state.pool, |conn| conn.execute_batch("SELECT 1"))
        .await
        .is_ok()
}

/// GET / - service summary.
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "OK",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mode: state.environment.as_str(),
        db_connected: db_ok(&state).await,
        endpoints: ENDPOINTS,
    })
}

/// GET /health - liveness plus a database round trip.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db = db_ok(&state).await;
    if !db {
        tracing::warn!("health check: database unreachable");
    }
    Json(HealthResponse {
        status: if db { "OK" } else { "degraded" },
        db,
    })
}
