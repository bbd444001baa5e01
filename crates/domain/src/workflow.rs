use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Invalid value: {0}")]
pub struct InvalidEnumValueError(pub String);

/// The booking lifecycle moment that activates a `Workflow`.
///
/// `BeforeEvent` and `AfterEvent` are anchored to the booking timespan,
/// the other triggers fire at the moment the lifecycle event happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowTrigger {
    BeforeEvent,
    AfterEvent,
    NewEvent,
    EventCancelled,
    RescheduleEvent,
}

impl WorkflowTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeEvent => "BEFORE_EVENT",
            Self::AfterEvent => "AFTER_EVENT",
            Self::NewEvent => "NEW_EVENT",
            Self::EventCancelled => "EVENT_CANCELLED",
            Self::RescheduleEvent => "RESCHEDULE_EVENT",
        }
    }
}

impl FromStr for WorkflowTrigger {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BEFORE_EVENT" => Ok(Self::BeforeEvent),
            "AFTER_EVENT" => Ok(Self::AfterEvent),
            "NEW_EVENT" => Ok(Self::NewEvent),
            "EVENT_CANCELLED" => Ok(Self::EventCancelled),
            "RESCHEDULE_EVENT" => Ok(Self::RescheduleEvent),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    pub fn in_millis(&self) -> i64 {
        match self {
            Self::Minute => 60 * 1000,
            Self::Hour => 60 * 60 * 1000,
            Self::Day => 24 * 60 * 60 * 1000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MINUTE" => Ok(Self::Minute),
            "HOUR" => Ok(Self::Hour),
            "DAY" => Ok(Self::Day),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

/// How far from the anchor timestamp a `BeforeEvent` / `AfterEvent`
/// workflow fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOffset {
    pub time: i64,
    #[serde(rename = "timeUnit")]
    pub unit: TimeUnit,
}

impl TriggerOffset {
    pub fn in_millis(&self) -> i64 {
        self.time * self.unit.in_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowAction {
    EmailHost,
    EmailAttendee,
    EmailAddress,
    SmsAttendee,
    SmsNumber,
    WhatsappAttendee,
    WhatsappNumber,
}

impl WorkflowAction {
    pub fn is_email_action(&self) -> bool {
        matches!(
            self,
            Self::EmailHost | Self::EmailAttendee | Self::EmailAddress
        )
    }

    pub fn is_phone_action(&self) -> bool {
        !self.is_email_action()
    }

    pub fn is_whatsapp_action(&self) -> bool {
        matches!(self, Self::WhatsappAttendee | Self::WhatsappNumber)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailHost => "EMAIL_HOST",
            Self::EmailAttendee => "EMAIL_ATTENDEE",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::SmsAttendee => "SMS_ATTENDEE",
            Self::SmsNumber => "SMS_NUMBER",
            Self::WhatsappAttendee => "WHATSAPP_ATTENDEE",
            Self::WhatsappNumber => "WHATSAPP_NUMBER",
        }
    }
}

impl FromStr for WorkflowAction {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL_HOST" => Ok(Self::EmailHost),
            "EMAIL_ATTENDEE" => Ok(Self::EmailAttendee),
            "EMAIL_ADDRESS" => Ok(Self::EmailAddress),
            "SMS_ATTENDEE" => Ok(Self::SmsAttendee),
            "SMS_NUMBER" => Ok(Self::SmsNumber),
            "WHATSAPP_ATTENDEE" => Ok(Self::WhatsappAttendee),
            "WHATSAPP_NUMBER" => Ok(Self::WhatsappNumber),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowTemplate {
    Reminder,
    Custom,
    Cancelled,
    Rescheduled,
    Completed,
}

impl WorkflowTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reminder => "REMINDER",
            Self::Custom => "CUSTOM",
            Self::Cancelled => "CANCELLED",
            Self::Rescheduled => "RESCHEDULED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl FromStr for WorkflowTemplate {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REMINDER" => Ok(Self::Reminder),
            "CUSTOM" => Ok(Self::Custom),
            "CANCELLED" => Ok(Self::Cancelled),
            "RESCHEDULED" => Ok(Self::Rescheduled),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

/// A single notification action within a `Workflow`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub id: ID,
    pub workflow_id: ID,
    pub action: WorkflowAction,
    pub template: WorkflowTemplate,
    /// Explicit recipient for the `*_ADDRESS` / `*_NUMBER` actions
    pub send_to: Option<String>,
    pub email_subject: Option<String>,
    pub reminder_body: Option<String>,
    pub sender: Option<String>,
    pub include_calendar_event: bool,
    /// Phone steps are skipped until the number has been verified
    pub number_verification_pending: bool,
    pub disable_on_mark_no_show: bool,
}

impl Entity for WorkflowStep {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// A user-configured automation rule pairing a trigger event with one
/// or more notification steps.
///
/// Scope is encoded by the owner fields: a personal workflow has only
/// `user_id`, a team or organization workflow has `team_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: ID,
    pub name: String,
    pub user_id: Option<ID>,
    pub team_id: Option<ID>,
    pub trigger: WorkflowTrigger,
    pub time: Option<TriggerOffset>,
    /// Whether this workflow applies to every event type of its owner
    pub is_active_on_all: bool,
    pub steps: Vec<WorkflowStep>,
}

impl Entity for Workflow {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// Computes the absolute timestamp in millis at which a reminder for
/// the given trigger should fire. `BeforeEvent` is anchored to the
/// booking start, `AfterEvent` to the booking end, the immediate
/// triggers fire right away.
pub fn reminder_fire_time(
    trigger: WorkflowTrigger,
    offset: Option<&TriggerOffset>,
    start_ts: i64,
    end_ts: i64,
    now: i64,
) -> i64 {
    let offset_millis = offset.map(|o| o.in_millis()).unwrap_or(0);
    match trigger {
        WorkflowTrigger::BeforeEvent => start_ts - offset_millis,
        WorkflowTrigger::AfterEvent => end_ts + offset_millis,
        WorkflowTrigger::NewEvent
        | WorkflowTrigger::EventCancelled
        | WorkflowTrigger::RescheduleEvent => now,
    }
}

impl Workflow {
    pub fn fire_time(&self, start_ts: i64, end_ts: i64, now: i64) -> i64 {
        reminder_fire_time(self.trigger, self.time.as_ref(), start_ts, end_ts, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 60 * 60 * 1000;

    #[test]
    fn trigger_offset_supports_minute_and_hour_granularity() {
        let offset = TriggerOffset {
            time: 30,
            unit: TimeUnit::Minute,
        };
        assert_eq!(offset.in_millis(), 30 * 60 * 1000);

        let offset = TriggerOffset {
            time: 12,
            unit: TimeUnit::Hour,
        };
        assert_eq!(offset.in_millis(), 12 * HOUR);

        let offset = TriggerOffset {
            time: 2,
            unit: TimeUnit::Day,
        };
        assert_eq!(offset.in_millis(), 48 * HOUR);
    }

    #[test]
    fn before_event_is_anchored_to_booking_start() {
        let offset = TriggerOffset {
            time: 1,
            unit: TimeUnit::Hour,
        };
        let fire_time = reminder_fire_time(
            WorkflowTrigger::BeforeEvent,
            Some(&offset),
            10 * HOUR,
            11 * HOUR,
            0,
        );
        assert_eq!(fire_time, 9 * HOUR);
    }

    #[test]
    fn after_event_is_anchored_to_booking_end() {
        let offset = TriggerOffset {
            time: 5,
            unit: TimeUnit::Minute,
        };
        let fire_time = reminder_fire_time(
            WorkflowTrigger::AfterEvent,
            Some(&offset),
            10 * HOUR,
            11 * HOUR,
            0,
        );
        assert_eq!(fire_time, 11 * HOUR + 5 * 60 * 1000);
    }

    #[test]
    fn immediate_triggers_fire_now() {
        for trigger in [
            WorkflowTrigger::NewEvent,
            WorkflowTrigger::EventCancelled,
            WorkflowTrigger::RescheduleEvent,
        ]
        .iter()
        {
            assert_eq!(
                reminder_fire_time(*trigger, None, 10 * HOUR, 11 * HOUR, 123),
                123
            );
        }
    }

    #[test]
    fn missing_offset_falls_back_to_the_anchor() {
        assert_eq!(
            reminder_fire_time(WorkflowTrigger::BeforeEvent, None, 10 * HOUR, 11 * HOUR, 0),
            10 * HOUR
        );
    }

    #[test]
    fn trigger_roundtrips_through_str() {
        for trigger in [
            WorkflowTrigger::BeforeEvent,
            WorkflowTrigger::AfterEvent,
            WorkflowTrigger::NewEvent,
            WorkflowTrigger::EventCancelled,
            WorkflowTrigger::RescheduleEvent,
        ]
        .iter()
        {
            assert_eq!(trigger.as_str().parse::<WorkflowTrigger>().unwrap(), *trigger);
        }
    }
}
