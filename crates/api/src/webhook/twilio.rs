use super::reconcile::ReconcileDeliveryStatusUseCase;
use crate::error::ChimeError;
use crate::shared::usecase::execute;
use actix_web::{web, HttpResponse};
use chime_api_structs::twilio_webhook::*;
use chime_api_structs::{WebhookAck, WebhookError};
use chime_domain::DeliveryStatus;
use chime_infra::ChimeContext;

/// Maps a Twilio message status to the internal delivery status.
/// Statuses outside this table are acknowledged and dropped.
fn delivery_status_for_event(event: &str) -> Option<DeliveryStatus> {
    match event {
        "delivered" => Some(DeliveryStatus::Delivered),
        "read" => Some(DeliveryStatus::Read),
        "undelivered" | "failed" => Some(DeliveryStatus::Failed),
        _ => None,
    }
}

pub async fn twilio_webhook_controller(
    query_params: web::Query<QueryParams>,
    body: web::Form<RequestBody>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let query_params = query_params.0;
    let body = body.0;
    if query_params.msg_id.is_empty() || body.status.is_empty() {
        return Err(ChimeError::BadClientData("Missing required fields".into()));
    }

    let status = match delivery_status_for_event(&body.status) {
        Some(status) => status,
        // Acknowledged with a 200 so Twilio does not keep retrying
        // events this service deliberately ignores
        None => return Ok(HttpResponse::Ok().json(WebhookError::status_not_handled())),
    };

    let usecase = ReconcileDeliveryStatusUseCase {
        msg_id: query_params.msg_id,
        event_type_id: query_params.event_type_id,
        channel: query_params.channel,
        status,
    };

    execute(usecase, &ctx)
        .await
        .map(|_| HttpResponse::Ok().json(WebhookAck::new()))
        .map_err(ChimeError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_the_recognized_twilio_statuses() {
        assert_eq!(
            delivery_status_for_event("delivered"),
            Some(DeliveryStatus::Delivered)
        );
        assert_eq!(
            delivery_status_for_event("read"),
            Some(DeliveryStatus::Read)
        );
        for event in ["undelivered", "failed"].iter() {
            assert_eq!(
                delivery_status_for_event(event),
                Some(DeliveryStatus::Failed)
            );
        }
    }

    #[test]
    fn ignores_unrecognized_twilio_statuses() {
        for event in ["queued", "sent", "accepted", ""].iter() {
            assert_eq!(delivery_status_for_event(event), None);
        }
    }
}
