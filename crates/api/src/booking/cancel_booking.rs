use super::subscribers::ScheduleRemindersOnBookingCancelled;
use crate::error::ChimeError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use crate::workflow::scheduling::cancel_reminders;
use actix_web::{web, HttpResponse};
use chime_api_structs::cancel_booking::*;
use chime_domain::{Booking, BookingStatus, ID};
use chime_infra::ChimeContext;

pub async fn cancel_booking_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let usecase = CancelBookingUseCase {
        booking_id: path_params.booking_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|booking| HttpResponse::Ok().json(APIResponse::new(booking)))
        .map_err(ChimeError::from)
}

/// Marks a booking as cancelled and cancels its pending reminders.
/// The reminder rows stay behind with a cancelled status.
#[derive(Debug)]
pub struct CancelBookingUseCase {
    pub booking_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    BookingAlreadyCancelled,
    StorageError,
}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(booking_id) => Self::NotFound(format!(
                "The booking with id: {}, was not found.",
                booking_id
            )),
            UseCaseError::BookingAlreadyCancelled => {
                Self::Conflict("The booking is already cancelled".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CancelBookingUseCase {
    type Response = Booking;

    type Error = UseCaseError;

    const NAME: &'static str = "CancelBooking";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        let mut booking = ctx
            .repos
            .bookings
            .find(&self.booking_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.booking_id.clone()))?;
        if booking.status == BookingStatus::Cancelled {
            return Err(UseCaseError::BookingAlreadyCancelled);
        }

        // Sweep the pending reminders before the cancellation workflows
        // run, so the cancellation notices they schedule survive
        let pending = ctx
            .repos
            .workflow_reminders
            .find_pending_by_booking(&self.booking_id)
            .await;
        cancel_reminders(pending, ctx).await;

        booking.status = BookingStatus::Cancelled;
        booking.updated = ctx.sys.get_timestamp_millis();
        ctx.repos
            .bookings
            .save(&booking)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(booking)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(ScheduleRemindersOnBookingCancelled)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::create_booking::CreateBookingUseCase;
    use chime_domain::{
        Attendee, Channel, DeliveryStatus, Workflow, WorkflowAction, WorkflowStep,
        WorkflowTemplate, WorkflowTrigger,
    };
    use chime_infra::{ISys, InMemoryEmailProvider};
    use std::sync::Arc;

    const HOUR: i64 = 60 * 60 * 1000;
    const NOW: i64 = 1_700_000_000_000;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            NOW
        }
    }

    struct TestContext {
        ctx: ChimeContext,
        email: Arc<InMemoryEmailProvider>,
    }

    fn setup() -> TestContext {
        let mut ctx = ChimeContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys {});
        let email = Arc::new(InMemoryEmailProvider::new());
        ctx.providers.email = email.clone();
        TestContext { ctx, email }
    }

    async fn insert_booking(ctx: &ChimeContext) -> Booking {
        let usecase = CreateBookingUseCase {
            event_type_id: Some(7),
            user_id: ID::default(),
            host_email: "host@onehash.test".into(),
            host_name: "Host".into(),
            team_id: None,
            org_id: None,
            title: "Quick chat".into(),
            start_ts: NOW + 24 * HOUR,
            end_ts: NOW + 25 * HOUR,
            attendees: vec![Attendee {
                name: "A".into(),
                email: "a@gmail.com".into(),
                phone_number: None,
                no_show: false,
            }],
            workflows_locked_for_user: true,
        };
        execute(usecase, ctx).await.unwrap().booking
    }

    #[actix_web::test]
    async fn cancelling_a_booking_cancels_its_pending_reminders() {
        let test = setup();
        let booking = insert_booking(&test.ctx).await;

        let pending_before = test
            .ctx
            .repos
            .workflow_reminders
            .find_pending_by_booking(&booking.id)
            .await;
        assert_eq!(pending_before.len(), 2);

        let usecase = CancelBookingUseCase {
            booking_id: booking.id.clone(),
        };
        let cancelled = execute(usecase, &test.ctx).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        assert!(test
            .ctx
            .repos
            .workflow_reminders
            .find_pending_by_booking(&booking.id)
            .await
            .is_empty());
        assert_eq!(test.email.cancelled.lock().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn cancelling_a_booking_fires_its_cancellation_workflows() {
        let test = setup();

        let workflow_id = ID::default();
        let workflow = Workflow {
            id: workflow_id.clone(),
            name: "Cancellation notice".into(),
            user_id: Some(ID::default()),
            team_id: None,
            trigger: WorkflowTrigger::EventCancelled,
            time: None,
            is_active_on_all: false,
            steps: vec![WorkflowStep {
                id: Default::default(),
                workflow_id: workflow_id.clone(),
                action: WorkflowAction::EmailAttendee,
                template: WorkflowTemplate::Cancelled,
                send_to: None,
                email_subject: None,
                reminder_body: None,
                sender: None,
                include_calendar_event: false,
                number_verification_pending: false,
                disable_on_mark_no_show: false,
            }],
        };
        test.ctx.repos.workflows.insert(&workflow).await.unwrap();
        test.ctx
            .repos
            .workflows
            .link_to_event_type(&workflow_id, 7)
            .await
            .unwrap();

        let booking = insert_booking(&test.ctx).await;
        let usecase = CancelBookingUseCase {
            booking_id: booking.id.clone(),
        };
        execute(usecase, &test.ctx).await.unwrap();

        // The cancellation notice scheduled by the subscriber is still
        // pending, the sweep only hit the reminders that existed before
        let pending = test
            .ctx
            .repos
            .workflow_reminders
            .find_pending_by_booking(&booking.id)
            .await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].step_id, Some(workflow.steps[0].id.clone()));
        assert_eq!(pending[0].channel, Channel::Email);
        assert_eq!(pending[0].status, DeliveryStatus::Pending);
    }

    #[actix_web::test]
    async fn cancelling_twice_is_rejected() {
        let test = setup();
        let booking = insert_booking(&test.ctx).await;

        let usecase = CancelBookingUseCase {
            booking_id: booking.id.clone(),
        };
        execute(usecase, &test.ctx).await.unwrap();

        let usecase = CancelBookingUseCase {
            booking_id: booking.id,
        };
        let res = execute(usecase, &test.ctx).await;
        assert!(matches!(res, Err(UseCaseError::BookingAlreadyCancelled)));
    }
}
