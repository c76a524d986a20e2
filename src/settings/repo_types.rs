use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// A settings document: always a JSON object at the top level.
pub type SettingsObject = Map<String, Value>;

/// Row as stored in the `settings` table.
#[derive(Debug, FromRow)]
pub struct SettingsRow {
    pub uid: Uuid,
    pub settings: Json<SettingsObject>, // jsonb, CHECK'd to be an object
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsRecord {
    pub uid: Uuid,
    pub settings: SettingsObject,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<SettingsRow> for SettingsRecord {
    fn from(r: SettingsRow) -> Self {
        Self {
            uid: r.uid,
            settings: r.settings.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
