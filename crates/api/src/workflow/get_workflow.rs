use crate::error::ChimeError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chime_api_structs::get_workflow::{APIResponse, PathParams};
use chime_domain::{Workflow, ID};
use chime_infra::ChimeContext;

pub async fn get_workflow_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let usecase = GetWorkflowUseCase {
        workflow_id: path_params.workflow_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|workflow| HttpResponse::Ok().json(APIResponse::new(workflow)))
        .map_err(ChimeError::from)
}

#[derive(Debug)]
pub struct GetWorkflowUseCase {
    pub workflow_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(workflow_id) => Self::NotFound(format!(
                "The workflow with id: {}, was not found.",
                workflow_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetWorkflowUseCase {
    type Response = Workflow;

    type Error = UseCaseError;

    const NAME: &'static str = "GetWorkflow";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .workflows
            .find(&self.workflow_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.workflow_id.clone()))
    }
}
