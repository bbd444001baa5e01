use chime_domain::{
    reminder_fire_time, Booking, Channel, DeliveryStatus, TriggerOffset, WorkflowReminder,
    WorkflowTemplate, WorkflowTrigger, ID,
};
use chime_infra::{ChimeContext, ScheduledEmail, ScheduledSms};
use chrono::{TimeZone, Utc};
use tracing::error;

fn format_start(booking: &Booking) -> String {
    Utc.timestamp_millis(booking.start_ts).to_rfc2822()
}

fn default_subject(template: WorkflowTemplate, booking: &Booking) -> String {
    match template {
        WorkflowTemplate::Reminder | WorkflowTemplate::Custom => {
            format!("Reminder: {} - {}", booking.title, format_start(booking))
        }
        WorkflowTemplate::Cancelled => format!("Cancelled: {}", booking.title),
        WorkflowTemplate::Rescheduled => format!("Rescheduled: {}", booking.title),
        WorkflowTemplate::Completed => format!("Thank you for attending: {}", booking.title),
    }
}

fn default_body(template: WorkflowTemplate, booking: &Booking) -> String {
    match template {
        WorkflowTemplate::Reminder | WorkflowTemplate::Custom => format!(
            "This is a reminder for your meeting {} with {} at {}.",
            booking.title,
            booking.host_name,
            format_start(booking)
        ),
        WorkflowTemplate::Cancelled => format!(
            "Your meeting {} with {} at {} has been cancelled.",
            booking.title,
            booking.host_name,
            format_start(booking)
        ),
        WorkflowTemplate::Rescheduled => format!(
            "Your meeting {} with {} has been rescheduled.",
            booking.title, booking.host_name
        ),
        WorkflowTemplate::Completed => format!(
            "Thank you for attending {} with {}.",
            booking.title, booking.host_name
        ),
    }
}

pub(crate) struct EmailReminderRequest<'a> {
    pub booking: &'a Booking,
    pub trigger: WorkflowTrigger,
    pub offset: Option<TriggerOffset>,
    pub recipients: Vec<String>,
    pub template: WorkflowTemplate,
    pub subject_override: Option<String>,
    pub body_override: Option<String>,
    pub sender: Option<String>,
    pub step_id: Option<ID>,
    pub include_calendar_event: bool,
    pub is_mandatory: bool,
}

/// Hands one email send to the provider and records the matching
/// reminder row. The generated msg id links the row to the provider's
/// event webhooks.
pub(crate) async fn schedule_email_reminder(
    req: EmailReminderRequest<'_>,
    ctx: &ChimeContext,
) -> anyhow::Result<WorkflowReminder> {
    let now = ctx.sys.get_timestamp_millis();
    let remind_at = reminder_fire_time(
        req.trigger,
        req.offset.as_ref(),
        req.booking.start_ts,
        req.booking.end_ts,
        now,
    );
    let msg_id = ID::new().as_string();

    let email = ScheduledEmail {
        to: req.recipients,
        subject: req
            .subject_override
            .unwrap_or_else(|| default_subject(req.template, req.booking)),
        body: req
            .body_override
            .unwrap_or_else(|| default_body(req.template, req.booking)),
        sender: req.sender,
        send_at: if remind_at > now { Some(remind_at) } else { None },
        msg_id: msg_id.clone(),
        event_type_id: req.booking.event_type_id,
        include_calendar_event: req.include_calendar_event,
    };
    ctx.providers.email.schedule(&email).await?;

    let reminder = WorkflowReminder {
        id: Default::default(),
        booking_id: Some(req.booking.id.clone()),
        step_id: req.step_id,
        event_type_id: req.booking.event_type_id,
        channel: Channel::Email,
        status: DeliveryStatus::Pending,
        remind_at,
        msg_id: Some(msg_id),
        is_mandatory: req.is_mandatory,
    };
    ctx.repos.workflow_reminders.insert(&reminder).await?;
    Ok(reminder)
}

pub(crate) struct PhoneReminderRequest<'a> {
    pub booking: &'a Booking,
    pub trigger: WorkflowTrigger,
    pub offset: Option<TriggerOffset>,
    pub recipient: String,
    pub whatsapp: bool,
    pub template: WorkflowTemplate,
    pub body_override: Option<String>,
    pub sender: Option<String>,
    pub step_id: Option<ID>,
}

/// Hands one sms or whatsapp send to the provider and records the
/// matching reminder row.
pub(crate) async fn schedule_phone_reminder(
    req: PhoneReminderRequest<'_>,
    ctx: &ChimeContext,
) -> anyhow::Result<WorkflowReminder> {
    let now = ctx.sys.get_timestamp_millis();
    let remind_at = reminder_fire_time(
        req.trigger,
        req.offset.as_ref(),
        req.booking.start_ts,
        req.booking.end_ts,
        now,
    );
    let msg_id = ID::new().as_string();

    let sms = ScheduledSms {
        to: req.recipient,
        body: req
            .body_override
            .unwrap_or_else(|| default_body(req.template, req.booking)),
        sender: req.sender,
        send_at: if remind_at > now { Some(remind_at) } else { None },
        whatsapp: req.whatsapp,
        msg_id: msg_id.clone(),
        event_type_id: req.booking.event_type_id,
    };
    ctx.providers.sms.schedule(&sms).await?;

    let reminder = WorkflowReminder {
        id: Default::default(),
        booking_id: Some(req.booking.id.clone()),
        step_id: req.step_id,
        event_type_id: req.booking.event_type_id,
        channel: if req.whatsapp {
            Channel::Whatsapp
        } else {
            Channel::Sms
        },
        status: DeliveryStatus::Pending,
        remind_at,
        msg_id: Some(msg_id),
        is_mandatory: false,
    };
    ctx.repos.workflow_reminders.insert(&reminder).await?;
    Ok(reminder)
}

/// Cancels the scheduled sends at the providers and flips the rows to
/// `Cancelled`. Provider and storage failures are logged and skipped,
/// a cancellation sweep must never fail the operation that started it.
pub(crate) async fn cancel_reminders(reminders: Vec<WorkflowReminder>, ctx: &ChimeContext) {
    for mut reminder in reminders {
        if let Some(msg_id) = &reminder.msg_id {
            let res = match reminder.channel {
                Channel::Email => ctx.providers.email.cancel_scheduled(msg_id).await,
                Channel::Sms | Channel::Whatsapp => {
                    ctx.providers.sms.cancel_scheduled(msg_id).await
                }
            };
            if let Err(e) = res {
                error!("Unable to cancel scheduled send {}. Err: {:?}", msg_id, e);
            }
        }

        if reminder.status.can_transition_to(DeliveryStatus::Cancelled) {
            reminder.status = DeliveryStatus::Cancelled;
            if let Err(e) = ctx.repos.workflow_reminders.save(&reminder).await {
                error!(
                    "Unable to mark reminder {} as cancelled. Err: {:?}",
                    reminder.id, e
                );
            }
        }
    }
}
