use super::scheduling::cancel_reminders;
use crate::error::ChimeError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chime_api_structs::delete_workflow::{APIResponse, PathParams};
use chime_domain::{Workflow, ID};
use chime_infra::ChimeContext;

pub async fn delete_workflow_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let usecase = DeleteWorkflowUseCase {
        workflow_id: path_params.workflow_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|workflow| HttpResponse::Ok().json(APIResponse::new(workflow)))
        .map_err(ChimeError::from)
}

/// Deletes a workflow together with its steps and links, and cancels
/// every reminder of those steps that is still pending.
#[derive(Debug)]
pub struct DeleteWorkflowUseCase {
    pub workflow_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(workflow_id) => Self::NotFound(format!(
                "The workflow with id: {}, was not found.",
                workflow_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteWorkflowUseCase {
    type Response = Workflow;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteWorkflow";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        let workflow = ctx
            .repos
            .workflows
            .find(&self.workflow_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.workflow_id.clone()))?;

        // The pending reminders must be collected before the delete
        // cascades the steps away
        let step_ids = workflow
            .steps
            .iter()
            .map(|step| step.id.clone())
            .collect::<Vec<_>>();
        let pending = ctx
            .repos
            .workflow_reminders
            .find_pending_by_steps(&step_ids)
            .await;
        cancel_reminders(pending, ctx).await;

        ctx.repos
            .workflows
            .delete(&self.workflow_id)
            .await
            .ok_or(UseCaseError::StorageError)?;

        Ok(workflow)
    }
}
