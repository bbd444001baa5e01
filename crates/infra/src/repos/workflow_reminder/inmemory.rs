use super::IWorkflowReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use chime_domain::{DeliveryStatus, WorkflowReminder, ID};

pub struct InMemoryWorkflowReminderRepo {
    reminders: std::sync::Mutex<Vec<WorkflowReminder>>,
}

impl InMemoryWorkflowReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IWorkflowReminderRepo for InMemoryWorkflowReminderRepo {
    async fn insert(&self, reminder: &WorkflowReminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &WorkflowReminder) -> anyhow::Result<()> {
        save(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<WorkflowReminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_by_msg_id(&self, msg_id: &str) -> Option<WorkflowReminder> {
        find_by(&self.reminders, |r: &WorkflowReminder| {
            r.msg_id.as_deref() == Some(msg_id)
        })
        .into_iter()
        .next()
    }

    async fn find_pending_by_booking(&self, booking_id: &ID) -> Vec<WorkflowReminder> {
        find_by(&self.reminders, |r: &WorkflowReminder| {
            r.booking_id.as_ref() == Some(booking_id) && r.status == DeliveryStatus::Pending
        })
    }

    async fn find_pending_by_steps(&self, step_ids: &[ID]) -> Vec<WorkflowReminder> {
        find_by(&self.reminders, |r: &WorkflowReminder| {
            r.status == DeliveryStatus::Pending
                && r.step_id
                    .as_ref()
                    .map(|step_id| step_ids.contains(step_id))
                    .unwrap_or(false)
        })
    }
}
