use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health -- probes the record store.
///
/// 200 when the store answers, 503 with the probe error otherwise.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let probe = state.store.ping().await;
    let status = if probe.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            ok: probe.is_ok(),
            backend: state.store.kind(),
            version: env!("CARGO_PKG_VERSION"),
            error: probe.err().map(|e| e.to_string()),
        }),
    )
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
