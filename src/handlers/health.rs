use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use tracing::error;

use crate::{db, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = match db::check_connection(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Database health check failed");
            false
        }
    };

    let status = if database_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database_up { "up" } else { "down" },
            version: env!("CARGO_PKG_VERSION"),
            database: if database_up { "up" } else { "down" },
        }),
    )
}
