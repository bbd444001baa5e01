use super::resolve_workflows::resolve_workflows;
use super::scheduling::{
    schedule_email_reminder, schedule_phone_reminder, EmailReminderRequest, PhoneReminderRequest,
};
use crate::shared::usecase::UseCase;
use chime_domain::{
    Booking, Workflow, WorkflowAction, WorkflowReminder, WorkflowStep, WorkflowTrigger,
};
use chime_infra::ChimeContext;
use tracing::{debug, error};

/// The booking lifecycle moment the dispatcher is reacting to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookingLifecycle {
    Created,
    Cancelled,
}

fn applicable_triggers(lifecycle: BookingLifecycle) -> &'static [WorkflowTrigger] {
    match lifecycle {
        BookingLifecycle::Created => &[
            WorkflowTrigger::NewEvent,
            WorkflowTrigger::BeforeEvent,
            WorkflowTrigger::AfterEvent,
        ],
        BookingLifecycle::Cancelled => &[WorkflowTrigger::EventCancelled],
    }
}

fn email_recipients(booking: &Booking, step: &WorkflowStep) -> Vec<String> {
    match step.action {
        WorkflowAction::EmailHost => vec![booking.host_email.clone()],
        WorkflowAction::EmailAttendee => booking
            .attendees
            .iter()
            .filter(|attendee| !(step.disable_on_mark_no_show && attendee.no_show))
            .map(|attendee| attendee.email.clone())
            .collect(),
        WorkflowAction::EmailAddress => step.send_to.clone().into_iter().collect(),
        _ => Vec::new(),
    }
}

fn phone_recipients(booking: &Booking, step: &WorkflowStep) -> Vec<String> {
    match step.action {
        WorkflowAction::SmsAttendee | WorkflowAction::WhatsappAttendee => booking
            .attendees
            .iter()
            .filter(|attendee| !(step.disable_on_mark_no_show && attendee.no_show))
            .filter_map(|attendee| attendee.phone_number.clone())
            .collect(),
        WorkflowAction::SmsNumber | WorkflowAction::WhatsappNumber => {
            step.send_to.clone().into_iter().collect()
        }
        _ => Vec::new(),
    }
}

async fn dispatch_step(
    booking: &Booking,
    workflow: &Workflow,
    step: &WorkflowStep,
    ctx: &ChimeContext,
) -> anyhow::Result<Vec<WorkflowReminder>> {
    if step.action.is_phone_action() && step.number_verification_pending {
        debug!(
            "Skipping workflow step {} until its phone number is verified",
            step.id
        );
        return Ok(Vec::new());
    }

    let mut reminders = Vec::new();
    if step.action.is_email_action() {
        let recipients = email_recipients(booking, step);
        if recipients.is_empty() {
            return Ok(reminders);
        }
        let reminder = schedule_email_reminder(
            EmailReminderRequest {
                booking,
                trigger: workflow.trigger,
                offset: workflow.time,
                recipients,
                template: step.template,
                subject_override: step.email_subject.clone(),
                body_override: step.reminder_body.clone(),
                sender: step.sender.clone(),
                step_id: Some(step.id.clone()),
                include_calendar_event: step.include_calendar_event,
                is_mandatory: false,
            },
            ctx,
        )
        .await?;
        reminders.push(reminder);
    } else {
        for recipient in phone_recipients(booking, step) {
            let reminder = schedule_phone_reminder(
                PhoneReminderRequest {
                    booking,
                    trigger: workflow.trigger,
                    offset: workflow.time,
                    recipient,
                    whatsapp: step.action.is_whatsapp_action(),
                    template: step.template,
                    body_override: step.reminder_body.clone(),
                    sender: step.sender.clone(),
                    step_id: Some(step.id.clone()),
                },
                ctx,
            )
            .await?;
            reminders.push(reminder);
        }
    }
    Ok(reminders)
}

/// Schedules the notification steps of every workflow applicable to a
/// booking lifecycle event.
#[derive(Debug)]
pub struct ScheduleWorkflowRemindersUseCase {
    pub booking: Booking,
    pub lifecycle: BookingLifecycle,
    pub workflows_locked_for_user: bool,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for ScheduleWorkflowRemindersUseCase {
    type Response = Vec<WorkflowReminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "ScheduleWorkflowReminders";

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

        let triggers = applicable_triggers(self.lifecycle);
        let mut scheduled = Vec::new();
        for workflow in workflows
            .iter()
            .filter(|workflow| triggers.contains(&workflow.trigger))
        {
            for step in &workflow.steps {
                // One failing step must not block its siblings
                match dispatch_step(&self.booking, workflow, step, ctx).await {
                    Ok(reminders) => scheduled.extend(reminders),
                    Err(e) => error!(
                        "Unable to dispatch workflow step {} for booking {}. Err: {:?}",
                        step.id, self.booking.id, e
                    ),
                }
            }
        }

        Ok(scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use chime_domain::{
        Attendee, BookingStatus, Channel, DeliveryStatus, TimeUnit, TriggerOffset,
        WorkflowTemplate, ID,
    };
    use chime_infra::{ISys, InMemoryEmailProvider, InMemorySmsProvider};
    use std::sync::Arc;

    const HOUR: i64 = 60 * 60 * 1000;
    const NOW: i64 = 1_700_000_000_000;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            NOW
        }
    }

    fn booking(event_type_id: i64) -> Booking {
        Booking {
            id: Default::default(),
            event_type_id: Some(event_type_id),
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
                    name: "Alice".into(),
                    email: "alice@example.test".into(),
                    phone_number: Some("+4712345678".into()),
                    no_show: false,
                },
                Attendee {
                    name: "Bob".into(),
                    email: "bob@example.test".into(),
                    phone_number: None,
                    no_show: true,
                },
            ],
            status: BookingStatus::Confirmed,
            created: NOW,
            updated: NOW,
        }
    }

    fn step(workflow_id: &ID, action: WorkflowAction) -> WorkflowStep {
        WorkflowStep {
            id: Default::default(),
            workflow_id: workflow_id.clone(),
            action,
            template: WorkflowTemplate::Reminder,
            send_to: None,
            email_subject: None,
            reminder_body: None,
            sender: None,
            include_calendar_event: false,
            number_verification_pending: false,
            disable_on_mark_no_show: false,
        }
    }

    fn before_event_workflow(user_id: &ID, steps: Vec<WorkflowStep>) -> Workflow {
        Workflow {
            id: Default::default(),
            name: "Attendee reminder".into(),
            user_id: Some(user_id.clone()),
            team_id: None,
            trigger: WorkflowTrigger::BeforeEvent,
            time: Some(TriggerOffset {
                time: 1,
                unit: TimeUnit::Hour,
            }),
            is_active_on_all: false,
            steps,
        }
    }

    struct TestContext {
        ctx: ChimeContext,
        email: Arc<InMemoryEmailProvider>,
        sms: Arc<InMemorySmsProvider>,
    }

    fn setup() -> TestContext {
        let mut ctx = ChimeContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys {});
        let email = Arc::new(InMemoryEmailProvider::new());
        let sms = Arc::new(InMemorySmsProvider::new());
        ctx.providers.email = email.clone();
        ctx.providers.sms = sms.clone();
        TestContext { ctx, email, sms }
    }

    async fn insert_event_type_workflow(
        ctx: &ChimeContext,
        event_type_id: i64,
        mut workflow: Workflow,
    ) -> Workflow {
        let workflow_id = workflow.id.clone();
        for step in workflow.steps.iter_mut() {
            step.workflow_id = workflow_id.clone();
        }
        ctx.repos.workflows.insert(&workflow).await.unwrap();
        ctx.repos
            .workflows
            .link_to_event_type(&workflow_id, event_type_id)
            .await
            .unwrap();
        workflow
    }

    #[actix_web::test]
    async fn schedules_email_and_sms_steps_for_a_new_booking() {
        let test = setup();
        let booking = booking(7);
        let workflow_id = ID::default();
        let workflow = Workflow {
            id: workflow_id.clone(),
            steps: vec![
                step(&workflow_id, WorkflowAction::EmailAttendee),
                step(&workflow_id, WorkflowAction::SmsAttendee),
            ],
            ..before_event_workflow(&booking.user_id, Vec::new())
        };
        insert_event_type_workflow(&test.ctx, 7, workflow).await;

        let usecase = ScheduleWorkflowRemindersUseCase {
            booking: booking.clone(),
            lifecycle: BookingLifecycle::Created,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &test.ctx).await.unwrap();
        assert_eq!(scheduled.len(), 2);

        let sent_emails = test.email.sent.lock().unwrap().clone();
        assert_eq!(sent_emails.len(), 1);
        assert_eq!(
            sent_emails[0].to,
            vec![
                "alice@example.test".to_string(),
                "bob@example.test".to_string()
            ]
        );
        // One hour before the booking starts
        assert_eq!(sent_emails[0].send_at, Some(booking.start_ts - HOUR));

        let sent_sms = test.sms.sent.lock().unwrap().clone();
        assert_eq!(sent_sms.len(), 1);
        assert_eq!(sent_sms[0].to, "+4712345678");
        assert!(!sent_sms[0].whatsapp);

        for reminder in scheduled {
            assert_eq!(reminder.status, DeliveryStatus::Pending);
            assert_eq!(reminder.booking_id, Some(booking.id.clone()));
            assert!(reminder.msg_id.is_some());
            assert_eq!(reminder.remind_at, booking.start_ts - HOUR);
        }
    }

    #[actix_web::test]
    async fn skips_no_show_attendees_when_the_step_disables_them() {
        let test = setup();
        let booking = booking(7);
        let workflow_id = ID::default();
        let mut no_show_step = step(&workflow_id, WorkflowAction::EmailAttendee);
        no_show_step.disable_on_mark_no_show = true;
        let workflow = Workflow {
            id: workflow_id.clone(),
            steps: vec![no_show_step],
            ..before_event_workflow(&booking.user_id, Vec::new())
        };
        insert_event_type_workflow(&test.ctx, 7, workflow).await;

        let usecase = ScheduleWorkflowRemindersUseCase {
            booking,
            lifecycle: BookingLifecycle::Created,
            workflows_locked_for_user: true,
        };
        execute(usecase, &test.ctx).await.unwrap();

        let sent_emails = test.email.sent.lock().unwrap().clone();
        assert_eq!(sent_emails.len(), 1);
        // Bob is marked no-show and is dropped from the recipients
        assert_eq!(sent_emails[0].to, vec!["alice@example.test".to_string()]);
    }

    #[actix_web::test]
    async fn skips_phone_steps_with_pending_number_verification() {
        let test = setup();
        let booking = booking(7);
        let workflow_id = ID::default();
        let mut pending_step = step(&workflow_id, WorkflowAction::SmsAttendee);
        pending_step.number_verification_pending = true;
        let workflow = Workflow {
            id: workflow_id.clone(),
            steps: vec![pending_step],
            ..before_event_workflow(&booking.user_id, Vec::new())
        };
        insert_event_type_workflow(&test.ctx, 7, workflow).await;

        let usecase = ScheduleWorkflowRemindersUseCase {
            booking,
            lifecycle: BookingLifecycle::Created,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &test.ctx).await.unwrap();

        assert!(scheduled.is_empty());
        assert!(test.sms.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn a_failing_step_does_not_block_its_siblings() {
        let test = setup();
        let booking = booking(7);
        test.email
            .failing_recipients
            .lock()
            .unwrap()
            .push("alice@example.test".into());

        let workflow_id = ID::default();
        let workflow = Workflow {
            id: workflow_id.clone(),
            steps: vec![
                step(&workflow_id, WorkflowAction::EmailAttendee),
                step(&workflow_id, WorkflowAction::SmsAttendee),
            ],
            ..before_event_workflow(&booking.user_id, Vec::new())
        };
        insert_event_type_workflow(&test.ctx, 7, workflow).await;

        let usecase = ScheduleWorkflowRemindersUseCase {
            booking,
            lifecycle: BookingLifecycle::Created,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &test.ctx).await.unwrap();

        // The email step failed at the provider, the sms step went out
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].channel, Channel::Sms);
        assert_eq!(test.sms.sent.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn cancellation_only_fires_event_cancelled_workflows() {
        let test = setup();
        let booking = booking(7);

        let before_id = ID::default();
        let before = Workflow {
            id: before_id.clone(),
            steps: vec![step(&before_id, WorkflowAction::EmailAttendee)],
            ..before_event_workflow(&booking.user_id, Vec::new())
        };
        insert_event_type_workflow(&test.ctx, 7, before).await;

        let cancelled_id = ID::default();
        let cancelled = Workflow {
            id: cancelled_id.clone(),
            trigger: WorkflowTrigger::EventCancelled,
            time: None,
            steps: vec![WorkflowStep {
                template: WorkflowTemplate::Cancelled,
                ..step(&cancelled_id, WorkflowAction::EmailAttendee)
            }],
            ..before_event_workflow(&booking.user_id, Vec::new())
        };
        insert_event_type_workflow(&test.ctx, 7, cancelled).await;

        let usecase = ScheduleWorkflowRemindersUseCase {
            booking,
            lifecycle: BookingLifecycle::Cancelled,
            workflows_locked_for_user: true,
        };
        let scheduled = execute(usecase, &test.ctx).await.unwrap();

        assert_eq!(scheduled.len(), 1);
        let sent_emails = test.email.sent.lock().unwrap().clone();
        assert_eq!(sent_emails.len(), 1);
        assert!(sent_emails[0].subject.starts_with("Cancelled:"));
        // An immediate trigger is sent right away
        assert_eq!(sent_emails[0].send_at, None);
    }
}
