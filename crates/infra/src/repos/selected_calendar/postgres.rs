use super::ISelectedCalendarRepo;

use chime_domain::{SelectedCalendar, ID, WATCH_BATCH_SIZE, WATCH_EXPIRATION_BUFFER_MILLIS};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresSelectedCalendarRepo {
    pool: PgPool,
}

impl PostgresSelectedCalendarRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SelectedCalendarRaw {
    calendar_uid: Uuid,
    user_uid: Uuid,
    integration: String,
    external_id: String,
    channel_id: Option<String>,
    channel_expiration: Option<i64>,
    sync_enabled: bool,
}

impl Into<SelectedCalendar> for SelectedCalendarRaw {
    fn into(self) -> SelectedCalendar {
        SelectedCalendar {
            id: ID::from(self.calendar_uid),
            user_id: ID::from(self.user_uid),
            integration: self.integration,
            external_id: self.external_id,
            channel_id: self.channel_id,
            channel_expiration: self.channel_expiration,
            sync_enabled: self.sync_enabled,
        }
    }
}

#[async_trait::async_trait]
impl ISelectedCalendarRepo for PostgresSelectedCalendarRepo {
    async fn insert(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO selected_calendars
            (calendar_uid, user_uid, integration, external_id, channel_id, channel_expiration, sync_enabled)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(calendar.id.inner_ref())
        .bind(calendar.user_id.inner_ref())
        .bind(&calendar.integration)
        .bind(&calendar.external_id)
        .bind(&calendar.channel_id)
        .bind(calendar.channel_expiration)
        .bind(calendar.sync_enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE selected_calendars SET
                channel_id = $2,
                channel_expiration = $3,
                sync_enabled = $4
            WHERE calendar_uid = $1
            "#,
        )
        .bind(calendar.id.inner_ref())
        .bind(&calendar.channel_id)
        .bind(calendar.channel_expiration)
        .bind(calendar.sync_enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, calendar_id: &ID) -> Option<SelectedCalendar> {
        sqlx::query_as::<_, SelectedCalendarRaw>(
            r#"
            SELECT * FROM selected_calendars
            WHERE calendar_uid = $1
            "#,
        )
        .bind(calendar_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find selected calendar {}. DB error: {:?}",
                calendar_id, e
            );
            None
        })
        .map(|calendar| calendar.into())
    }

    async fn get_next_batch_to_watch(&self, now: i64) -> Vec<SelectedCalendar> {
        let renewal_threshold = now + WATCH_EXPIRATION_BUFFER_MILLIS;
        sqlx::query_as::<_, SelectedCalendarRaw>(
            r#"
            SELECT * FROM selected_calendars
            WHERE sync_enabled = TRUE
            AND (channel_expiration IS NULL OR channel_expiration <= $1)
            LIMIT $2
            "#,
        )
        .bind(renewal_threshold)
        .bind(WATCH_BATCH_SIZE)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch calendars to watch. DB error: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|calendar| calendar.into())
        .collect()
    }

    async fn get_next_batch_to_unwatch(&self) -> Vec<SelectedCalendar> {
        sqlx::query_as::<_, SelectedCalendarRaw>(
            r#"
            SELECT * FROM selected_calendars
            WHERE sync_enabled = FALSE AND channel_id IS NOT NULL
            LIMIT $1
            "#,
        )
        .bind(WATCH_BATCH_SIZE)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch calendars to unwatch. DB error: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|calendar| calendar.into())
        .collect()
    }
}
