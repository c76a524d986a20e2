use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{SettingsObject, SettingsRecord, SettingsRow};

/// Persistence seam for settings documents. Every method is a single round
/// trip; callers compose them without a transaction.
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn insert(&self, uid: Uuid, settings: &SettingsObject) -> anyhow::Result<SettingsRecord>;
    async fn find(&self, uid: Uuid) -> anyhow::Result<Option<SettingsRecord>>;
    /// Replace the whole document; `None` when no row has this uid.
    async fn replace(
        &self,
        uid: Uuid,
        settings: &SettingsObject,
    ) -> anyhow::Result<Option<SettingsRecord>>;
    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, uid: Uuid) -> anyhow::Result<u64>;
    /// Newest first, `uid` descending on equal `created_at`.
    async fn list_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<SettingsRecord>>;
    async fn count(&self) -> anyhow::Result<i64>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgSettingsRepo {
    db: PgPool,
}

impl PgSettingsRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepo for PgSettingsRepo {
    async fn insert(&self, uid: Uuid, settings: &SettingsObject) -> anyhow::Result<SettingsRecord> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO settings (uid, settings)
            VALUES ($1, $2)
            RETURNING uid, settings, created_at, updated_at
            "#,
        )
        .bind(uid)
        .bind(Json(settings))
        .fetch_one(&self.db)
        .await
        .context("insert settings")?;
        Ok(row.into())
    }

    async fn find(&self, uid: Uuid) -> anyhow::Result<Option<SettingsRecord>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT uid, settings, created_at, updated_at
              FROM settings
             WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await
        .context("find settings by uid")?;
        Ok(row.map(Into::into))
    }

    async fn replace(
        &self,
        uid: Uuid,
        settings: &SettingsObject,
    ) -> anyhow::Result<Option<SettingsRecord>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            UPDATE settings
               SET settings = $2, updated_at = now()
             WHERE uid = $1
            RETURNING uid, settings, created_at, updated_at
            "#,
        )
        .bind(uid)
        .bind(Json(settings))
        .fetch_optional(&self.db)
        .await
        .context("replace settings")?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, uid: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM settings WHERE uid = $1")
            .bind(uid)
            .execute(&self.db)
            .await
            .context("delete settings")?;
        Ok(res.rows_affected())
    }

    async fn list_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<SettingsRecord>> {
        let rows = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT uid, settings, created_at, updated_at
              FROM settings
             ORDER BY created_at DESC, uid DESC
             LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list settings page")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM settings")
            .fetch_one(&self.db)
            .await
            .context("count settings")?;
        Ok(total)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .context("ping database")?;
        Ok(())
    }
}


#[cfg(test)]
mod pg_tests {
    use super::*;
    use serde_json::json;

    fn object(v: serde_json::Value) -> SettingsObject {
        v.as_object().cloned().expect("object literal")
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL instance in DATABASE_URL"]
    async fn postgres_roundtrip_and_ordering() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let db = PgPool::connect(&url).await.expect("connect");
        sqlx::migrate!("./migrations").run(&db).await.expect("migrate");
        let repo = PgSettingsRepo::new(db.clone());

        repo.ping().await.expect("ping");

        let uid = Uuid::new_v4();
        let created = repo.insert(uid, &object(json!({"a": 1}))).await.unwrap();
        assert_eq!(created.settings, object(json!({"a": 1})));

        let replaced = repo
            .replace(uid, &object(json!({"b": [1, 2]})))
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(replaced.settings, object(json!({"b": [1, 2]})));
        assert_eq!(replaced.created_at, created.created_at);
        assert!(replaced.updated_at >= created.updated_at);

        // Pin two rows to the same far-future instant to see the tie-break.
        let other = Uuid::new_v4();
        repo.insert(other, &object(json!({}))).await.unwrap();
        sqlx::query("UPDATE settings SET created_at = '3000-01-01T00:00:00Z' WHERE uid = ANY($1)")
            .bind(vec![uid, other])
            .execute(&db)
            .await
            .unwrap();
        let page = repo.list_page(2, 0).await.unwrap();
        let mut expected = vec![uid, other];
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(page.iter().map(|r| r.uid).collect::<Vec<_>>(), expected);

        assert_eq!(repo.delete(uid).await.unwrap(), 1);
        assert_eq!(repo.delete(uid).await.unwrap(), 0);
        assert_eq!(repo.delete(other).await.unwrap(), 1);
        assert!(repo.find(uid).await.unwrap().is_none());
        assert!(repo.replace(uid, &object(json!({}))).await.unwrap().is_none());
    }
}
