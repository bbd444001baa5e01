mod inmemory;
mod postgres;

use chime_domain::{WorkflowReminder, ID};
pub use inmemory::InMemoryWorkflowReminderRepo;
pub use postgres::PostgresWorkflowReminderRepo;

#[async_trait::async_trait]
pub trait IWorkflowReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &WorkflowReminder) -> anyhow::Result<()>;
    async fn save(&self, reminder: &WorkflowReminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<WorkflowReminder>;
    /// Lookup by the provider message id, the key delivery webhooks
    /// reconcile on
    async fn find_by_msg_id(&self, msg_id: &str) -> Option<WorkflowReminder>;
    async fn find_pending_by_booking(&self, booking_id: &ID) -> Vec<WorkflowReminder>;
    async fn find_pending_by_steps(&self, step_ids: &[ID]) -> Vec<WorkflowReminder>;
}
