use super::reconcile::ReconcileDeliveryStatusUseCase;
use crate::error::ChimeError;
use crate::shared::usecase::execute;
use actix_web::{web, HttpResponse};
use chime_api_structs::sendgrid_webhook::*;
use chime_api_structs::{WebhookAck, WebhookError};
use chime_domain::{Channel, DeliveryStatus};
use chime_infra::ChimeContext;

/// Maps a SendGrid event name to the internal delivery status.
/// Events outside this table are acknowledged and dropped.
fn delivery_status_for_event(event: &str) -> Option<DeliveryStatus> {
    match event {
        "delivered" => Some(DeliveryStatus::Delivered),
        "open" => Some(DeliveryStatus::Read),
        "dropped" | "bounce" | "deferred" => Some(DeliveryStatus::Failed),
        _ => None,
    }
}

pub async fn sendgrid_webhook_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let body = body.0;
    if body.msg_id.is_empty() || body.event.is_empty() {
        return Err(ChimeError::BadClientData("Missing required fields".into()));
    }

    let status = match delivery_status_for_event(&body.event) {
        Some(status) => status,
        // Acknowledged with a 200 so SendGrid does not keep retrying
        // events this service deliberately ignores
        None => return Ok(HttpResponse::Ok().json(WebhookError::status_not_handled())),
    };

    let usecase = ReconcileDeliveryStatusUseCase {
        msg_id: body.msg_id,
        event_type_id: body.event_type_id,
        channel: Channel::Email,
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
    fn maps_the_recognized_sendgrid_events() {
        assert_eq!(
            delivery_status_for_event("delivered"),
            Some(DeliveryStatus::Delivered)
        );
        assert_eq!(
            delivery_status_for_event("open"),
            Some(DeliveryStatus::Read)
        );
        for event in ["dropped", "bounce", "deferred"].iter() {
            assert_eq!(
                delivery_status_for_event(event),
                Some(DeliveryStatus::Failed)
            );
        }
    }

    #[test]
    fn ignores_unrecognized_sendgrid_events() {
        for event in ["processed", "click", "spamreport", "unsubscribe", ""].iter() {
            assert_eq!(delivery_status_for_event(event), None);
        }
    }
}
