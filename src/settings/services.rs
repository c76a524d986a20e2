use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::repo::SettingsRepo;
use super::repo_types::{SettingsObject, SettingsRecord};
use super::validation::Pagination;
use crate::error::ApiError;

/// One page of the `created_at DESC, uid DESC` ordering plus the table count.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<SettingsRecord>,
    pub limit: u64,
    pub offset: u64,
    pub total: i64,
}

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepo>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepo>) -> Self {
        Self { repo }
    }

    /// A uid collision is reported by the store as a unique violation and
    /// comes back as a storage failure; there is no retry with a fresh uid.
    pub async fn create(&self, settings: SettingsObject) -> Result<SettingsRecord, ApiError> {
        let uid = Uuid::new_v4();
        let record = self.repo.insert(uid, &settings).await?;
        info!(
            uid = %record.uid,
            created_at = %record.created_at,
            keys = record.settings.len(),
            "settings created"
        );
        Ok(record)
    }

    pub async fn get(&self, uid: Uuid) -> Result<SettingsRecord, ApiError> {
        self.repo.find(uid).await?.ok_or(ApiError::NotFound)
    }

    /// Full replace. Concurrent writers: last one wins.
    pub async fn update(
        &self,
        uid: Uuid,
        settings: SettingsObject,
    ) -> Result<SettingsRecord, ApiError> {
        let record = self
            .repo
            .replace(uid, &settings)
            .await?
            .ok_or(ApiError::NotFound)?;
        info!(uid = %record.uid, updated_at = %record.updated_at, "settings replaced");
        Ok(record)
    }

    /// Succeeds whether or not the row existed.
    pub async fn delete(&self, uid: Uuid) -> Result<(), ApiError> {
        let removed = self.repo.delete(uid).await?;
        if removed == 0 {
            debug!(%uid, "delete of absent settings");
        } else {
            info!(%uid, "settings deleted");
        }
        Ok(())
    }

    /// Two independent queries: the count can disagree with the page under
    /// concurrent writes.
    pub async fn list(&self, p: Pagination) -> Result<Page, ApiError> {
        let limit = i64::try_from(p.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(p.offset).unwrap_or(i64::MAX);
        let items = self.repo.list_page(limit, offset).await?;
        let total = self.repo.count().await?;
        Ok(Page {
            items,
            limit: p.limit,
            offset: p.offset,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::repo::fake::FakeSettingsRepo;
    use axum::http::StatusCode;
    use serde_json::json;

    fn object(v: serde_json::Value) -> SettingsObject {
        v.as_object().cloned().expect("object literal")
    }

    fn service() -> (SettingsService, Arc<FakeSettingsRepo>) {
        let repo = Arc::new(FakeSettingsRepo::new());
        (SettingsService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_then_get_returns_same_document() {
        let (svc, _) = service();
        let doc = object(json!({"theme": "dark", "limits": {"max": 3}, "tags": ["a"]}));
        let created = svc.create(doc.clone()).await.unwrap();
        assert_eq!(created.uid.get_version_num(), 4);
        let fetched = svc.get(created.uid).await.unwrap();
        assert_eq!(fetched.settings, doc);
    }

    #[tokio::test]
    async fn create_generates_distinct_uids() {
        let (svc, repo) = service();
        let a = svc.create(object(json!({}))).await.unwrap();
        let b = svc.create(object(json!({}))).await.unwrap();
        assert_ne!(a.uid, b.uid);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_and_keeps_created_at() {
        let (svc, _) = service();
        let created = svc.create(object(json!({"a": 1}))).await.unwrap();
        let updated = svc.update(created.uid, object(json!({"b": 2}))).await.unwrap();
        assert_eq!(updated.settings, object(json!({"b": 2})));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn get_and_update_of_unknown_uid_are_not_found() {
        let (svc, _) = service();
        let uid = Uuid::new_v4();
        assert!(matches!(svc.get(uid).await, Err(ApiError::NotFound)));
        assert!(matches!(
            svc.update(uid, object(json!({}))).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (svc, repo) = service();
        let created = svc.create(object(json!({"x": true}))).await.unwrap();
        svc.delete(created.uid).await.unwrap();
        svc.delete(created.uid).await.unwrap();
        svc.delete(Uuid::new_v4()).await.unwrap();
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn list_pages_and_counts() {
        let (svc, _) = service();
        for i in 0..25 {
            svc.create(object(json!({ "i": i }))).await.unwrap();
        }
        let first = svc.list(Pagination { limit: 20, offset: 0 }).await.unwrap();
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.total, 25);
        assert_eq!(first.items[0].settings, object(json!({"i": 24})));

        let second = svc.list(Pagination { limit: 20, offset: 20 }).await.unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.offset, 20);
        assert_eq!(second.items[4].settings, object(json!({"i": 0})));

        let beyond = svc
            .list(Pagination { limit: 20, offset: u64::MAX })
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[tokio::test]
    async fn store_failures_become_storage_errors() {
        let (svc, repo) = service();
        let created = svc.create(object(json!({}))).await.unwrap();
        repo.set_failing(true);
        assert!(matches!(
            svc.create(object(json!({}))).await,
            Err(ApiError::Storage(_))
        ));
        assert!(matches!(svc.get(created.uid).await, Err(ApiError::Storage(_))));
        assert!(matches!(svc.delete(created.uid).await, Err(ApiError::Storage(_))));
        assert!(matches!(
            svc.list(Pagination::default()).await,
            Err(ApiError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn uid_collision_is_a_storage_failure() {
        let (svc, repo) = service();
        let first = svc.create(object(json!({"a": 1}))).await.unwrap();

        let err: ApiError = repo
            .insert(first.uid, &object(json!({"b": 2})))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            ApiError::Storage(e) => assert!(e.to_string().contains("settings_pkey")),
            other => panic!("expected storage failure, got {other:?}"),
        }

        assert_eq!(repo.len(), 1);
        assert_eq!(svc.get(first.uid).await.unwrap().settings, object(json!({"a": 1})));
    }
}
