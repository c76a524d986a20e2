use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use super::repo_types::SettingsObject;
use super::validation::{self, Pagination, BAD_PAGINATION, BODY_NOT_OBJECT, UID_MALFORMED};
use crate::error::ApiError;

/// Request body that passed the object-shape check.
///
/// Reads raw bytes instead of going through `axum::Json`, so a missing
/// content type, broken JSON and non-object JSON all become the same 400.
/// A body over the request size limit stays a 413.
#[derive(Debug)]
pub struct SettingsBody(pub SettingsObject);

#[async_trait]
impl<S> FromRequest<S> for SettingsBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = match Bytes::from_request(req, state).await {
            Ok(raw) => raw,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(ApiError::PayloadTooLarge);
            }
            Err(rejection) => {
                tracing::debug!(error = %rejection, "could not read request body");
                return Err(ApiError::Validation(BODY_NOT_OBJECT));
            }
        };
        validation::settings_object(&raw).map(SettingsBody)
    }
}

/// `:uid` path segment in canonical UUID form.
#[derive(Debug, Clone, Copy)]
pub struct SettingsUid(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for SettingsUid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(UID_MALFORMED))?;
        validation::parse_uid(&raw).map(SettingsUid)
    }
}

// Kept as strings so "-1" and "abc" reach our own check instead of a serde
// rejection with a different message.
#[derive(Debug, Deserialize)]
struct RawPagination {
    limit: Option<String>,
    offset: Option<String>,
}

/// `?limit=&offset=`, defaulted and clamped.
#[derive(Debug, Clone, Copy)]
pub struct Paging(pub Pagination);

#[async_trait]
impl<S> FromRequestParts<S> for Paging
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawPagination>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(BAD_PAGINATION))?;
        Pagination::parse(raw.limit.as_deref(), raw.offset.as_deref()).map(Paging)
    }
}
