use chime_domain::{TriggerOffset, Workflow, WorkflowStep, WorkflowTrigger, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDTO {
    pub id: ID,
    pub name: String,
    pub user_id: Option<ID>,
    pub team_id: Option<ID>,
    pub trigger: WorkflowTrigger,
    pub time: Option<TriggerOffset>,
    pub is_active_on_all: bool,
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowDTO {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            id: workflow.id.clone(),
            name: workflow.name,
            user_id: workflow.user_id.clone(),
            team_id: workflow.team_id.clone(),
            trigger: workflow.trigger,
            time: workflow.time,
            is_active_on_all: workflow.is_active_on_all,
            steps: workflow.steps,
        }
    }
}
