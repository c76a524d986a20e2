use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{SettingsObject, SettingsRecord};
use super::services::Page;

/// `{uid, settings}` as returned by create, get, update and list.
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsItem {
    pub uid: Uuid,
    pub settings: SettingsObject,
}

impl From<SettingsRecord> for SettingsItem {
    fn from(r: SettingsRecord) -> Self {
        Self {
            uid: r.uid,
            settings: r.settings,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageInfo {
    pub limit: u64,
    pub offset: u64,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub items: Vec<SettingsItem>,
    pub page: PageInfo,
}

impl From<Page> for ListResponse {
    fn from(p: Page) -> Self {
        Self {
            items: p.items.into_iter().map(SettingsItem::from).collect(),
            page: PageInfo {
                limit: p.limit,
                offset: p.offset,
                total: p.total,
            },
        }
    }
}
