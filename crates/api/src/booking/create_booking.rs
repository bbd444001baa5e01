use super::subscribers::{
    ScheduleMandatoryReminderOnBookingCreated, ScheduleRemindersOnBookingCreated,
};
use crate::error::ChimeError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use chime_api_structs::create_booking::*;
use chime_domain::{Attendee, Booking, BookingStatus, ID};
use chime_infra::ChimeContext;

pub async fn create_booking_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    let body = body.0;
    let usecase = CreateBookingUseCase {
        event_type_id: body.event_type_id,
        user_id: body.user_id,
        host_email: body.host_email,
        host_name: body.host_name,
        team_id: body.team_id,
        org_id: body.org_id,
        title: body.title,
        start_ts: body.start_ts,
        end_ts: body.end_ts,
        attendees: body.attendees,
        workflows_locked_for_user: body.workflows_locked_for_user.unwrap_or(true),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Created().json(APIResponse::new(res.booking)))
        .map_err(ChimeError::from)
}

#[derive(Debug)]
pub struct CreateBookingUseCase {
    pub event_type_id: Option<i64>,
    pub user_id: ID,
    pub host_email: String,
    pub host_name: String,
    pub team_id: Option<ID>,
    pub org_id: Option<ID>,
    pub title: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub attendees: Vec<Attendee>,
    pub workflows_locked_for_user: bool,
}

/// The created booking together with the workflow resolution inputs
/// the reminder subscribers need.
#[derive(Debug)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub workflows_locked_for_user: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidTimespan,
    StorageError,
}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidTimespan => {
                Self::BadClientData("The booking end has to be after its start".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateBookingUseCase {
    type Response = CreatedBooking;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateBooking";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        if self.end_ts <= self.start_ts {
            return Err(UseCaseError::InvalidTimespan);
        }

        let now = ctx.sys.get_timestamp_millis();
        let booking = Booking {
            id: Default::default(),
            event_type_id: self.event_type_id,
            user_id: self.user_id.clone(),
            host_email: self.host_email.clone(),
            host_name: self.host_name.clone(),
            team_id: self.team_id.clone(),
            org_id: self.org_id.clone(),
            title: self.title.clone(),
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            attendees: self.attendees.clone(),
            status: BookingStatus::Confirmed,
            created: now,
            updated: now,
        };

        ctx.repos
            .bookings
            .insert(&booking)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(CreatedBooking {
            booking,
            workflows_locked_for_user: self.workflows_locked_for_user,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(ScheduleRemindersOnBookingCreated),
            Box::new(ScheduleMandatoryReminderOnBookingCreated),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_domain::{
        Channel, TimeUnit, TriggerOffset, Workflow, WorkflowAction, WorkflowStep,
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

    fn create_booking_usecase() -> CreateBookingUseCase {
        CreateBookingUseCase {
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
        }
    }

    fn setup() -> (ChimeContext, Arc<InMemoryEmailProvider>) {
        let mut ctx = ChimeContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys {});
        let email = Arc::new(InMemoryEmailProvider::new());
        ctx.providers.email = email.clone();
        (ctx, email)
    }

    #[actix_web::test]
    async fn creating_a_booking_schedules_the_mandatory_fallback() {
        let (ctx, email) = setup();

        let res = execute(create_booking_usecase(), &ctx)
            .await
            .expect("To create booking");
        assert_eq!(res.booking.status, BookingStatus::Confirmed);
        assert!(ctx.repos.bookings.find(&res.booking.id).await.is_some());

        // No workflows exist, so only the two mandatory reminders go out
        let sent = email.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);

        let pending = ctx
            .repos
            .workflow_reminders
            .find_pending_by_booking(&res.booking.id)
            .await;
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.is_mandatory));
    }

    #[actix_web::test]
    async fn creating_a_booking_schedules_its_event_type_workflows() {
        let (ctx, email) = setup();

        let workflow_id = ID::default();
        let workflow = Workflow {
            id: workflow_id.clone(),
            name: "Attendee reminder".into(),
            user_id: Some(ID::default()),
            team_id: None,
            trigger: WorkflowTrigger::BeforeEvent,
            time: Some(TriggerOffset {
                time: 1,
                unit: TimeUnit::Hour,
            }),
            is_active_on_all: false,
            steps: vec![WorkflowStep {
                id: Default::default(),
                workflow_id: workflow_id.clone(),
                action: WorkflowAction::EmailAttendee,
                template: WorkflowTemplate::Reminder,
                send_to: None,
                email_subject: None,
                reminder_body: None,
                sender: None,
                include_calendar_event: false,
                number_verification_pending: false,
                disable_on_mark_no_show: false,
            }],
        };
        ctx.repos.workflows.insert(&workflow).await.unwrap();
        ctx.repos
            .workflows
            .link_to_event_type(&workflow_id, 7)
            .await
            .unwrap();

        let res = execute(create_booking_usecase(), &ctx)
            .await
            .expect("To create booking");

        // The workflow qualifies as an attendee reminder, so the
        // mandatory fallback stays out of the picture
        let pending = ctx
            .repos
            .workflow_reminders
            .find_pending_by_booking(&res.booking.id)
            .await;
        assert_eq!(pending.len(), 1);
        assert!(!pending[0].is_mandatory);
        assert_eq!(pending[0].channel, Channel::Email);
        assert_eq!(pending[0].step_id, Some(workflow.steps[0].id.clone()));
        assert_eq!(email.sent.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn rejects_a_booking_that_ends_before_it_starts() {
        let (ctx, _) = setup();
        let mut usecase = create_booking_usecase();
        usecase.end_ts = usecase.start_ts;

        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::InvalidTimespan);
    }
}
