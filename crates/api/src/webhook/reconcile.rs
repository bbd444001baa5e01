use crate::error::ChimeError;
use crate::shared::usecase::UseCase;
use chime_domain::{Channel, DeliveryStatus, WorkflowReminder};
use chime_infra::ChimeContext;
use tracing::error;

/// Applies a delivery status reported by a provider webhook to the
/// reminder identified by the provider message id.
///
/// The update is an upsert: when the webhook wins the race against the
/// dispatcher persisting its record, a fresh row is created with the
/// reported status instead of failing.
#[derive(Debug)]
pub struct ReconcileDeliveryStatusUseCase {
    pub msg_id: String,
    pub event_type_id: i64,
    pub channel: Channel,
    pub status: DeliveryStatus,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ReconcileDeliveryStatusUseCase {
    type Response = WorkflowReminder;

    type Error = UseCaseError;

    const NAME: &'static str = "ReconcileDeliveryStatus";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        match ctx
            .repos
            .workflow_reminders
            .find_by_msg_id(&self.msg_id)
            .await
        {
            Some(mut reminder) => {
                if reminder.status.can_transition_to(self.status) {
                    reminder.status = self.status;
                    ctx.repos
                        .workflow_reminders
                        .save(&reminder)
                        .await
                        .map_err(|e| {
                            error!(
                                "Unable to update reminder status for msg id {}. Err: {:?}",
                                self.msg_id, e
                            );
                            UseCaseError::StorageError
                        })?;
                }
                Ok(reminder)
            }
            None => {
                let reminder = WorkflowReminder {
                    id: Default::default(),
                    booking_id: None,
                    step_id: None,
                    event_type_id: Some(self.event_type_id),
                    channel: self.channel,
                    status: self.status,
                    remind_at: ctx.sys.get_timestamp_millis(),
                    msg_id: Some(self.msg_id.clone()),
                    is_mandatory: false,
                };
                ctx.repos
                    .workflow_reminders
                    .insert(&reminder)
                    .await
                    .map_err(|e| {
                        error!(
                            "Unable to insert reminder for msg id {}. Err: {:?}",
                            self.msg_id, e
                        );
                        UseCaseError::StorageError
                    })?;
                Ok(reminder)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use chime_domain::ID;

    fn pending_reminder(msg_id: &str) -> WorkflowReminder {
        WorkflowReminder {
            id: Default::default(),
            booking_id: Some(ID::default()),
            step_id: Some(ID::default()),
            event_type_id: Some(5),
            channel: Channel::Sms,
            status: DeliveryStatus::Pending,
            remind_at: 100,
            msg_id: Some(msg_id.to_string()),
            is_mandatory: false,
        }
    }

    #[actix_web::test]
    async fn creates_a_reminder_when_the_msg_id_is_unseen() {
        let ctx = ChimeContext::create_inmemory();

        let usecase = ReconcileDeliveryStatusUseCase {
            msg_id: "m1".into(),
            event_type_id: 5,
            channel: Channel::Sms,
            status: DeliveryStatus::Delivered,
        };
        let reminder = execute(usecase, &ctx).await.expect("To reconcile status");

        assert_eq!(reminder.status, DeliveryStatus::Delivered);
        assert_eq!(reminder.channel, Channel::Sms);
        assert_eq!(reminder.event_type_id, Some(5));

        let stored = ctx
            .repos
            .workflow_reminders
            .find_by_msg_id("m1")
            .await
            .expect("Reminder to be created");
        assert_eq!(stored.status, DeliveryStatus::Delivered);
        assert!(stored.booking_id.is_none());
    }

    #[actix_web::test]
    async fn updates_the_status_of_an_existing_reminder() {
        let ctx = ChimeContext::create_inmemory();
        let reminder = pending_reminder("m2");
        ctx.repos
            .workflow_reminders
            .insert(&reminder)
            .await
            .unwrap();

        let usecase = ReconcileDeliveryStatusUseCase {
            msg_id: "m2".into(),
            event_type_id: 5,
            channel: Channel::Sms,
            status: DeliveryStatus::Delivered,
        };
        execute(usecase, &ctx).await.expect("To reconcile status");

        let stored = ctx
            .repos
            .workflow_reminders
            .find_by_msg_id("m2")
            .await
            .unwrap();
        assert_eq!(stored.id, reminder.id);
        assert_eq!(stored.status, DeliveryStatus::Delivered);
        // The original channel and booking reference are kept
        assert_eq!(stored.booking_id, reminder.booking_id);
    }

    #[actix_web::test]
    async fn applying_the_same_status_twice_is_idempotent() {
        let ctx = ChimeContext::create_inmemory();
        ctx.repos
            .workflow_reminders
            .insert(&pending_reminder("m3"))
            .await
            .unwrap();

        for _ in 0..2 {
            let usecase = ReconcileDeliveryStatusUseCase {
                msg_id: "m3".into(),
                event_type_id: 5,
                channel: Channel::Sms,
                status: DeliveryStatus::Delivered,
            };
            execute(usecase, &ctx).await.expect("To reconcile status");
        }

        let stored = ctx
            .repos
            .workflow_reminders
            .find_by_msg_id("m3")
            .await
            .unwrap();
        assert_eq!(stored.status, DeliveryStatus::Delivered);
    }

    #[actix_web::test]
    async fn out_of_order_delivered_does_not_regress_read() {
        let ctx = ChimeContext::create_inmemory();
        ctx.repos
            .workflow_reminders
            .insert(&pending_reminder("m4"))
            .await
            .unwrap();

        for status in [DeliveryStatus::Read, DeliveryStatus::Delivered].iter() {
            let usecase = ReconcileDeliveryStatusUseCase {
                msg_id: "m4".into(),
                event_type_id: 5,
                channel: Channel::Sms,
                status: *status,
            };
            execute(usecase, &ctx).await.expect("To reconcile status");
        }

        let stored = ctx
            .repos
            .workflow_reminders
            .find_by_msg_id("m4")
            .await
            .unwrap();
        assert_eq!(stored.status, DeliveryStatus::Read);
    }
}
