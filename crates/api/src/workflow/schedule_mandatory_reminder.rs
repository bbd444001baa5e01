use super::resolve_workflows::resolve_workflows;
use super::scheduling::{schedule_email_reminder, EmailReminderRequest};
use crate::shared::usecase::UseCase;
use chime_domain::{
    Booking, TimeUnit, TriggerOffset, Workflow, WorkflowAction, WorkflowReminder,
    WorkflowTemplate, WorkflowTrigger,
};
use chime_infra::ChimeContext;
use tracing::error;

/// Attendees on this mail provider get the fallback reminders. This is
/// encoded product policy, do not widen or drop it without product
/// sign-off.
const MANDATORY_REMINDER_EMAIL_DOMAIN: &str = "@gmail.com";

/// A `BeforeEvent` attendee email within this window counts as an
/// existing reminder and suppresses the fallback.
const QUALIFYING_WINDOW_HOURS: i64 = 12;
const QUALIFYING_WINDOW_MINUTES: i64 = 720;

fn within_qualifying_window(offset: &TriggerOffset) -> bool {
    match offset.unit {
        TimeUnit::Hour => offset.time <= QUALIFYING_WINDOW_HOURS,
        TimeUnit::Minute => offset.time <= QUALIFYING_WINDOW_MINUTES,
        TimeUnit::Day => false,
    }
}

fn has_qualifying_workflow(workflows: &[Workflow]) -> bool {
    workflows.iter().any(|workflow| {
        workflow.trigger == WorkflowTrigger::BeforeEvent
            && workflow
                .time
                .as_ref()
                .map(within_qualifying_window)
                .unwrap_or(false)
            && workflow
                .steps
                .iter()
                .any(|step| step.action == WorkflowAction::EmailAttendee)
    })
}

/// Fallback policy for bookings without an attendee-facing reminder
/// workflow: attendees on the mandatory-reminder mail domain get a
/// reminder email one hour before the event and a thank-you email five
/// minutes after it.
///
/// This runs as a side effect of booking creation and must never fail
/// it, every error here is caught and logged.
#[derive(Debug)]
pub struct ScheduleMandatoryReminderUseCase {
    pub booking: Booking,
    pub workflows_locked_for_user: bool,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for ScheduleMandatoryReminderUseCase {
    type Response = Vec<WorkflowReminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "ScheduleMandatoryReminder";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        let event_type_workflows = match self.booking.event_type_id {
            Some(event_type_id) => ctx.repos.workflows.find_by_event_type(event_type_id).await,
            None => Vec::new(),
        };
        let workflows = resolve_workflows(
            event_type_workflows,
            Some(&self.booking.user_id),
            self.booking.team_id.as_ref(),
            self.booking.org_id.as_ref(),
            self.workflows_locked_for_user,
            ctx,
        )
        .await;

        if has_qualifying_workflow(&workflows) {
            return Ok(Vec::new());
        }

        let filtered_attendees = self
            .booking
            .attendees
            .iter()
            .filter(|attendee| attendee.email.ends_with(MANDATORY_REMINDER_EMAIL_DOMAIN))
            .map(|attendee| attendee.email.clone())
            .collect::<Vec<_>>();
        if filtered_attendees.is_empty() {
            return Ok(Vec::new());
        }

        let mut scheduled = Vec::new();

        // Event reminder email scheduled for 1 hour before the event
        let reminder = schedule_email_reminder(
            EmailReminderRequest {
                booking: &self.booking,
                trigger: WorkflowTrigger::BeforeEvent,
                offset: Some(TriggerOffset {
                    time: 1,
                    unit: TimeUnit::Hour,
                }),
                recipients: filtered_attendees.clone(),
                template: WorkflowTemplate::Reminder,
                subject_override: None,
                body_override: None,
                sender: None,
                step_id: None,
                include_calendar_event: false,
                is_mandatory: true,
            },
            ctx,
        )
        .await;
        match reminder {
            Ok(reminder) => scheduled.push(reminder),
            Err(e) => error!("Error while scheduling mandatory reminders: {:?}", e),
        }

        // Thank you email scheduled for 5 mins after the event
        let thank_you = schedule_email_reminder(
            EmailReminderRequest {
                booking: &self.booking,
                trigger: WorkflowTrigger::AfterEvent,
                offset: Some(TriggerOffset {
                    time: 5,
                    unit: TimeUnit::Minute,
                }),
                recipients: filtered_attendees,
                template: WorkflowTemplate::Completed,
                subject_override: None,
                body_override: None,
                sender: None,
                step_id: None,
                include_calendar_event: false,
                is_mandatory: true,
            },
            ctx,
        )
        .await;
        match thank_you {
            Ok(reminder) => scheduled.push(reminder),
            Err(e) => error!("Error while scheduling mandatory reminders: {:?}", e),
        }

        Ok(scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use chime_domain::{Attendee, BookingStatus, Channel, DeliveryStatus, WorkflowStep, ID};
    use chime_infra::{ISys, InMemoryEmailProvider};
    use std::sync::Arc;

    const HOUR: i64 = 60 * 60 * 1000;
    const MINUTE: i64 = 60 * 1000;
    const NOW: i64 = 1_700_000_000_000;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            NOW
        }
    }

    fn booking() -> Booking {
        Booking {
            id: Default::default(),
            event_type_id: Some(7),
            user_id: ID::default(),
            host_email: "host@onehash.test".into(),
            host_name: "Host".into(),
            team_id: None,
            org_id: None,
            title: "Quick chat".into(),
            start_ts: NOW + 24 * HOUR,
            end_ts: NOW + 25 * HOUR,
            attendees: vec![
                Attendee {
                    name: "A".into(),
                    email: "a@gmail.com".into(),
                    phone_number: None,
                    no_show: false,
                },
                Attendee {
                    name: "B".into(),
                    email: "b@example.com".into(),
                    phone_number: None,
                    no_show: false,
                },
            ],
            status: BookingStatus::Confirmed,
            created: NOW,
            updated: NOW,
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
    async fn schedules_the_two_fallback_reminders_for_gmail_attendees_only() {
        let (ctx, email) = setup();
        let booking = booking();

        let usecase = ScheduleMandatoryReminderUseCase {
            booking: booking.clone(),
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &ctx).await.unwrap();
        assert_eq!(scheduled.len(), 2);

        let sent = email.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        for email in sent.iter() {
            assert_eq!(email.to, vec!["a@gmail.com".to_string()]);
            assert!(!email.include_calendar_event);
        }
        assert_eq!(sent[0].send_at, Some(booking.start_ts - HOUR));
        assert_eq!(sent[1].send_at, Some(booking.end_ts + 5 * MINUTE));

        for reminder in scheduled.iter() {
            assert!(reminder.is_mandatory);
            assert!(reminder.step_id.is_none());
            assert_eq!(reminder.channel, Channel::Email);
            assert_eq!(reminder.status, DeliveryStatus::Pending);
        }
    }

    #[actix_web::test]
    async fn does_nothing_when_a_qualifying_workflow_exists() {
        let (ctx, email) = setup();
        let booking = booking();

        let workflow_id = ID::default();
        let workflow = Workflow {
            id: workflow_id.clone(),
            name: "Attendee reminder".into(),
            user_id: Some(booking.user_id.clone()),
            team_id: None,
            trigger: WorkflowTrigger::BeforeEvent,
            time: Some(TriggerOffset {
                time: 12,
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

        let usecase = ScheduleMandatoryReminderUseCase {
            booking,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &ctx).await.unwrap();

        assert!(scheduled.is_empty());
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn a_workflow_outside_the_window_does_not_suppress_the_fallback() {
        let (ctx, email) = setup();
        let booking = booking();

        let workflow_id = ID::default();
        let workflow = Workflow {
            id: workflow_id.clone(),
            name: "Day before reminder".into(),
            user_id: Some(booking.user_id.clone()),
            team_id: None,
            trigger: WorkflowTrigger::BeforeEvent,
            time: Some(TriggerOffset {
                time: 24,
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

        let usecase = ScheduleMandatoryReminderUseCase {
            booking,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &ctx).await.unwrap();

        assert_eq!(scheduled.len(), 2);
        assert_eq!(email.sent.lock().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn does_nothing_without_gmail_attendees() {
        let (ctx, email) = setup();
        let mut booking = booking();
        booking.attendees.remove(0);

        let usecase = ScheduleMandatoryReminderUseCase {
            booking,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &ctx).await.unwrap();

        assert!(scheduled.is_empty());
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn provider_failures_are_swallowed() {
        let (ctx, email) = setup();
        let booking = booking();
        email
            .failing_recipients
            .lock()
            .unwrap()
            .push("a@gmail.com".into());

        let usecase = ScheduleMandatoryReminderUseCase {
            booking,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &ctx).await.unwrap();

        assert!(scheduled.is_empty());
    }
}
