use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{settings::repo::SettingsRepo, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DbHealth {
    pub ok: bool,
    pub db: String,
}

/// Probes the store on every call; nothing is cached.
pub async fn check_store_reachable(repo: &dyn SettingsRepo) -> StoreStatus {
    match repo.ping().await {
        Ok(()) => {
            debug!("database reachable");
            StoreStatus::Up
        }
        Err(e) => {
            error!(error = ?e, "database health check failed");
            StoreStatus::Down
        }
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/health/db", get(db_health))
}

pub async fn db_health(State(state): State<AppState>) -> (StatusCode, Json<DbHealth>) {
    match check_store_reachable(state.repo.as_ref()).await {
        StoreStatus::Up => (
            StatusCode::OK,
            Json(DbHealth {
                ok: true,
                db: "up".into(),
            }),
        ),
        StoreStatus::Down => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DbHealth {
                ok: false,
                db: "down".into(),
            }),
        ),
    }
}
