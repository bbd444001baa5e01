mod inmemory;
mod postgres;

use chime_domain::{Workflow, ID};
pub use inmemory::InMemoryWorkflowRepo;
pub use postgres::PostgresWorkflowRepo;

#[async_trait::async_trait]
pub trait IWorkflowRepo: Send + Sync {
    async fn insert(&self, workflow: &Workflow) -> anyhow::Result<()>;
    async fn find(&self, workflow_id: &ID) -> Option<Workflow>;
    async fn delete(&self, workflow_id: &ID) -> Option<Workflow>;

    async fn link_to_event_type(&self, workflow_id: &ID, event_type_id: i64)
        -> anyhow::Result<()>;
    async fn link_to_team(&self, workflow_id: &ID, team_id: &ID) -> anyhow::Result<()>;
    async fn add_team_member(
        &self,
        team_id: &ID,
        user_id: &ID,
        accepted: bool,
    ) -> anyhow::Result<()>;

    /// Workflows attached directly to an event type
    async fn find_by_event_type(&self, event_type_id: i64) -> Vec<Workflow>;
    /// Workflows linked to the given team
    async fn find_by_team_links(&self, team_id: &ID) -> Vec<Workflow>;
    /// Workflows linked to any team the user is an accepted member of
    async fn find_by_user_memberships(&self, user_id: &ID) -> Vec<Workflow>;
    /// Active-on-all workflows owned by the given team or organization
    async fn find_active_on_all_for_team(&self, team_id: &ID) -> Vec<Workflow>;
    /// Active-on-all personal workflows of the given user
    async fn find_active_on_all_personal(&self, user_id: &ID) -> Vec<Workflow>;
}
