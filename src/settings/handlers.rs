use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{ListResponse, SettingsItem};
use super::extractors::{Paging, SettingsBody, SettingsUid};
use crate::{error::ApiError, state::AppState};

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(list_settings).post(create_settings))
        .route(
            "/settings/:uid",
            get(get_settings)
                .put(update_settings)
                .delete(delete_settings),
        )
}

/// POST /api/settings
#[instrument(skip(state, body))]
pub async fn create_settings(
    State(state): State<AppState>,
    SettingsBody(body): SettingsBody,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.settings.create(body).await?;
    let location = format!("/api/settings/{}", record.uid);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(SettingsItem::from(record)),
    ))
}

/// GET /api/settings/:uid
#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    SettingsUid(uid): SettingsUid,
) -> Result<Json<SettingsItem>, ApiError> {
    let record = state.settings.get(uid).await?;
    Ok(Json(record.into()))
}

/// PUT /api/settings/:uid, full replace
#[instrument(skip(state, body))]
pub async fn update_settings(
    State(state): State<AppState>,
    SettingsUid(uid): SettingsUid,
    SettingsBody(body): SettingsBody,
) -> Result<Json<SettingsItem>, ApiError> {
    let record = state.settings.update(uid, body).await?;
    Ok(Json(record.into()))
}

/// DELETE /api/settings/:uid, 204 even when nothing was there
#[instrument(skip(state))]
pub async fn delete_settings(
    State(state): State<AppState>,
    SettingsUid(uid): SettingsUid,
) -> Result<StatusCode, ApiError> {
    state.settings.delete(uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/settings?limit=&offset=
#[instrument(skip(state))]
pub async fn list_settings(
    State(state): State<AppState>,
    Paging(p): Paging,
) -> Result<Json<ListResponse>, ApiError> {
    let page = state.settings.list(p).await?;
    Ok(Json(page.into()))
}
