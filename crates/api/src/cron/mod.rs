mod cache_cleanup;
mod calendar_watch;

use crate::error::ChimeError;
use actix_web::{web, HttpRequest};
use cache_cleanup::cleanup_calendar_cache_controller;
use calendar_watch::sync_calendar_watches_controller;
use chime_infra::ChimeContext;
use tracing::error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/cron/calendar-watch",
        web::get().to(sync_calendar_watches_controller),
    );
    cfg.route(
        "/cron/calendar-cache-cleanup",
        web::get().to(cleanup_calendar_cache_controller),
    );
}

/// The cron endpoints may only be invoked by the platform scheduler,
/// which authenticates with the shared cron secret.
pub(crate) fn validate_cron_request(
    http_req: &HttpRequest,
    ctx: &ChimeContext,
) -> Result<(), ChimeError> {
    let auth_header = http_req
        .headers()
        .get("authorization")
        .and_then(|header| header.to_str().ok());

    match auth_header {
        Some(header) if header == format!("Bearer {}", ctx.config.cron_secret) => Ok(()),
        _ => {
            error!("Unauthorized cron request");
            Err(ChimeError::Unauthorized(
                "Missing or invalid cron secret".into(),
            ))
        }
    }
}
