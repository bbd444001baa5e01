use crate::dtos::WorkflowDTO;
use chime_domain::{
    TriggerOffset, Workflow, WorkflowAction, WorkflowTemplate, WorkflowTrigger, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub workflow: WorkflowDTO,
}

impl WorkflowResponse {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow: WorkflowDTO::new(workflow),
        }
    }
}

pub mod create_workflow {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StepInput {
        pub action: WorkflowAction,
        pub template: WorkflowTemplate,
        pub send_to: Option<String>,
        pub email_subject: Option<String>,
        pub reminder_body: Option<String>,
        pub sender: Option<String>,
        pub include_calendar_event: Option<bool>,
        pub number_verification_pending: Option<bool>,
        pub disable_on_mark_no_show: Option<bool>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub user_id: Option<ID>,
        pub team_id: Option<ID>,
        pub trigger: WorkflowTrigger,
        pub time: Option<TriggerOffset>,
        pub is_active_on_all: Option<bool>,
        /// Event types this workflow is directly attached to
        pub event_type_ids: Option<Vec<i64>>,
        /// Organization teams this workflow is linked to
        pub team_ids: Option<Vec<ID>>,
        pub steps: Vec<StepInput>,
    }

    pub type APIResponse = WorkflowResponse;
}

pub mod get_workflow {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub workflow_id: ID,
    }

    pub type APIResponse = WorkflowResponse;
}

pub mod delete_workflow {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub workflow_id: ID,
    }

    pub type APIResponse = WorkflowResponse;
}
