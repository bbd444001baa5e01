use super::ICalendarCacheRepo;

use crate::repos::shared::repo::DeleteResult;
use chime_domain::CalendarCacheEntry;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresCalendarCacheRepo {
    pool: PgPool,
}

impl PostgresCalendarCacheRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ICalendarCacheRepo for PostgresCalendarCacheRepo {
    async fn insert(&self, entry: &CalendarCacheEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_cache
            (entry_uid, cache_key, cache_value, expires_at)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(entry.id.inner_ref())
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_all_expired(&self, now: i64) -> DeleteResult {
        match sqlx::query(
            r#"
            DELETE FROM calendar_cache
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        {
            Ok(res) => DeleteResult {
                deleted_count: res.rows_affected() as i64,
            },
            Err(e) => {
                error!("Unable to delete expired cache entries. DB error: {:?}", e);
                DeleteResult { deleted_count: 0 }
            }
        }
    }
}
