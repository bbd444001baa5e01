mod create_workflow;
mod delete_workflow;
mod get_workflow;
pub mod resolve_workflows;
pub mod schedule_mandatory_reminder;
pub mod schedule_reminders;
pub(crate) mod scheduling;

use actix_web::web;
use create_workflow::create_workflow_controller;
use delete_workflow::delete_workflow_controller;
use get_workflow::get_workflow_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/workflows", web::post().to(create_workflow_controller));
    cfg.route(
        "/workflows/{workflow_id}",
        web::get().to(get_workflow_controller),
    );
    cfg.route(
        "/workflows/{workflow_id}",
        web::delete().to(delete_workflow_controller),
    );
}
