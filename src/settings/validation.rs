//! Input checks that run before anything touches the store.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use super::repo_types::SettingsObject;
use crate::error::ApiError;

pub const BODY_NOT_OBJECT: &str = "body must be a JSON object";
pub const UID_MALFORMED: &str = "uid malformed";
pub const BAD_PAGINATION: &str = "limit/offset must be non-negative integers";

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Canonical 8-4-4-4-12 form, version 1-5, RFC 4122 variant.
pub(crate) fn is_valid_uid(raw: &str) -> bool {
    lazy_static! {
        static ref UID_RE: Regex = Regex::new(
            r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
        )
        .unwrap();
    }
    UID_RE.is_match(raw)
}

pub fn parse_uid(raw: &str) -> Result<Uuid, ApiError> {
    if !is_valid_uid(raw) {
        return Err(ApiError::Validation(UID_MALFORMED));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(UID_MALFORMED))
}

/// Accepts only a JSON object. Unparsable bytes, an empty body and any other
/// JSON value are the same rejection.
pub fn settings_object(raw: &[u8]) -> Result<SettingsObject, ApiError> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::Validation(BODY_NOT_OBJECT)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// `limit` is clamped to [`MAX_LIMIT`]; `offset` is taken as given.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, ApiError> {
        let limit = match limit {
            Some(v) => non_negative(v)?.min(MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(v) => non_negative(v)?,
            None => 0,
        };
        Ok(Self { limit, offset })
    }
}

/// Plain decimal digits only. Values past `u64::MAX` saturate: a huge limit
/// still clamps and a huge offset still means "past the end".
fn non_negative(raw: &str) -> Result<u64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::Validation(BAD_PAGINATION));
    }
    Ok(raw.parse::<u64>().unwrap_or(u64::MAX))
}
