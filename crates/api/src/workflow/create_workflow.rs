use crate::error::ChimeError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chime_api_structs::create_workflow::{APIResponse, RequestBody, StepInput};
use chime_domain::{TriggerOffset, Workflow, WorkflowStep, WorkflowTrigger, ID};
use chime_infra::ChimeContext;

pub async fn create_workflow_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let body = body.0;
    let usecase = CreateWorkflowUseCase {
        name: body.name,
        user_id: body.user_id,
        team_id: body.team_id,
        trigger: body.trigger,
        time: body.time,
        is_active_on_all: body.is_active_on_all.unwrap_or(false),
        event_type_ids: body.event_type_ids.unwrap_or_default(),
        team_ids: body.team_ids.unwrap_or_default(),
        steps: body.steps,
    };

    execute(usecase, &ctx)
        .await
        .map(|workflow| HttpResponse::Created().json(APIResponse::new(workflow)))
        .map_err(ChimeError::from)
}

#[derive(Debug)]
pub struct CreateWorkflowUseCase {
    pub name: String,
    pub user_id: Option<ID>,
    pub team_id: Option<ID>,
    pub trigger: WorkflowTrigger,
    pub time: Option<TriggerOffset>,
    pub is_active_on_all: bool,
    pub event_type_ids: Vec<i64>,
    pub team_ids: Vec<ID>,
    pub steps: Vec<StepInput>,
}

#[derive(Debug)]
pub enum UseCaseError {
    MissingOwner,
    StorageError,
}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::MissingOwner => {
                Self::BadClientData("A workflow must belong to a user or a team".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateWorkflowUseCase {
    type Response = Workflow;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateWorkflow";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        if self.user_id.is_none() && self.team_id.is_none() {
            return Err(UseCaseError::MissingOwner);
        }

        let workflow_id = ID::default();
        let steps = self
            .steps
            .drain(..)
            .map(|step| WorkflowStep {
                id: Default::default(),
                workflow_id: workflow_id.clone(),
                action: step.action,
                template: step.template,
                send_to: step.send_to,
                email_subject: step.email_subject,
                reminder_body: step.reminder_body,
                sender: step.sender,
                include_calendar_event: step.include_calendar_event.unwrap_or(false),
                number_verification_pending: step.number_verification_pending.unwrap_or(false),
                disable_on_mark_no_show: step.disable_on_mark_no_show.unwrap_or(false),
            })
            .collect();

        let workflow = Workflow {
            id: workflow_id,
            name: std::mem::take(&mut self.name),
            user_id: self.user_id.clone(),
            team_id: self.team_id.clone(),
            trigger: self.trigger,
            time: self.time,
            is_active_on_all: self.is_active_on_all,
            steps,
        };

        ctx.repos
            .workflows
            .insert(&workflow)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        for event_type_id in &self.event_type_ids {
            ctx.repos
                .workflows
                .link_to_event_type(&workflow.id, *event_type_id)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }
        for team_id in &self.team_ids {
            ctx.repos
                .workflows
                .link_to_team(&workflow.id, team_id)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }

        Ok(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_domain::{WorkflowAction, WorkflowTemplate};

    #[actix_web::test]
    async fn creates_a_workflow_with_its_steps_and_links() {
        let ctx = ChimeContext::create_inmemory();
        let user_id = ID::default();

        let usecase = CreateWorkflowUseCase {
            name: "Attendee reminder".into(),
            user_id: Some(user_id),
            team_id: None,
            trigger: WorkflowTrigger::BeforeEvent,
            time: None,
            is_active_on_all: false,
            event_type_ids: vec![7],
            team_ids: Vec::new(),
            steps: vec![StepInput {
                action: WorkflowAction::EmailAttendee,
                template: WorkflowTemplate::Reminder,
                send_to: None,
                email_subject: None,
                reminder_body: None,
                sender: None,
                include_calendar_event: None,
                number_verification_pending: None,
                disable_on_mark_no_show: None,
            }],
        };
        let workflow = execute(usecase, &ctx).await.expect("To create workflow");
        assert_eq!(workflow.steps.len(), 1);
        assert_eq!(workflow.steps[0].workflow_id, workflow.id);

        let by_event_type = ctx.repos.workflows.find_by_event_type(7).await;
        assert_eq!(by_event_type.len(), 1);
        assert_eq!(by_event_type[0].id, workflow.id);
    }

    #[actix_web::test]
    async fn rejects_a_workflow_without_an_owner() {
        let ctx = ChimeContext::create_inmemory();

        let usecase = CreateWorkflowUseCase {
            name: "Orphan".into(),
            user_id: None,
            team_id: None,
            trigger: WorkflowTrigger::BeforeEvent,
            time: None,
            is_active_on_all: false,
            event_type_ids: Vec::new(),
            team_ids: Vec::new(),
            steps: Vec::new(),
        };
        let res = execute(usecase, &ctx).await;
        assert!(matches!(res, Err(UseCaseError::MissingOwner)));
    }
}
