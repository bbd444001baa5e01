use super::IWorkflowReminderRepo;

use chime_domain::{Channel, DeliveryStatus, WorkflowReminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresWorkflowReminderRepo {
    pool: PgPool,
}

impl PostgresWorkflowReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkflowReminderRaw {
    reminder_uid: Uuid,
    booking_uid: Option<Uuid>,
    step_uid: Option<Uuid>,
    event_type_id: Option<i64>,
    channel: String,
    status: String,
    remind_at: i64,
    msg_id: Option<String>,
    is_mandatory: bool,
}

impl Into<WorkflowReminder> for WorkflowReminderRaw {
    fn into(self) -> WorkflowReminder {
        WorkflowReminder {
            id: ID::from(self.reminder_uid),
            booking_id: self.booking_uid.map(ID::from),
            step_id: self.step_uid.map(ID::from),
            event_type_id: self.event_type_id,
            channel: Channel::from_str(&self.channel).unwrap_or(Channel::Email),
            status: DeliveryStatus::from_str(&self.status).unwrap_or(DeliveryStatus::Pending),
            remind_at: self.remind_at,
            msg_id: self.msg_id,
            is_mandatory: self.is_mandatory,
        }
    }
}

#[async_trait::async_trait]
impl IWorkflowReminderRepo for PostgresWorkflowReminderRepo {
    async fn insert(&self, reminder: &WorkflowReminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflow_reminders
            (reminder_uid, booking_uid, step_uid, event_type_id, channel, status, remind_at, msg_id, is_mandatory)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.booking_id.as_ref().map(|id| *id.inner_ref()))
        .bind(reminder.step_id.as_ref().map(|id| *id.inner_ref()))
        .bind(reminder.event_type_id)
        .bind(reminder.channel.as_str())
        .bind(reminder.status.as_str())
        .bind(reminder.remind_at)
        .bind(&reminder.msg_id)
        .bind(reminder.is_mandatory)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, reminder: &WorkflowReminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE workflow_reminders SET
                status = $2,
                remind_at = $3,
                msg_id = $4
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.status.as_str())
        .bind(reminder.remind_at)
        .bind(&reminder.msg_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<WorkflowReminder> {
        sqlx::query_as::<_, WorkflowReminderRaw>(
            r#"
            SELECT * FROM workflow_reminders
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find workflow reminder {}. DB error: {:?}",
                reminder_id, e
            );
            None
        })
        .map(|reminder| reminder.into())
    }

    async fn find_by_msg_id(&self, msg_id: &str) -> Option<WorkflowReminder> {
        sqlx::query_as::<_, WorkflowReminderRaw>(
            r#"
            SELECT * FROM workflow_reminders
            WHERE msg_id = $1
            "#,
        )
        .bind(msg_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find workflow reminder with msg id {}. DB error: {:?}",
                msg_id, e
            );
            None
        })
        .map(|reminder| reminder.into())
    }

    async fn find_pending_by_booking(&self, booking_id: &ID) -> Vec<WorkflowReminder> {
        sqlx::query_as::<_, WorkflowReminderRaw>(
            r#"
            SELECT * FROM workflow_reminders
            WHERE booking_uid = $1 AND status = 'PENDING'
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to fetch pending reminders for booking {}. DB error: {:?}",
                booking_id, e
            );
            Vec::new()
        })
        .into_iter()
        .map(|reminder| reminder.into())
        .collect()
    }

    async fn find_pending_by_steps(&self, step_ids: &[ID]) -> Vec<WorkflowReminder> {
        let step_uids = step_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        sqlx::query_as::<_, WorkflowReminderRaw>(
            r#"
            SELECT * FROM workflow_reminders
            WHERE step_uid = ANY($1) AND status = 'PENDING'
            "#,
        )
        .bind(&step_uids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to fetch pending reminders for steps. DB error: {:?}",
                e
            );
            Vec::new()
        })
        .into_iter()
        .map(|reminder| reminder.into())
        .collect()
    }
}
