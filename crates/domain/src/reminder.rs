use crate::shared::entity::{Entity, ID};
use crate::workflow::InvalidEnumValueError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Delivery medium for a `WorkflowReminder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
            Self::Whatsapp => "WHATSAPP",
        }
    }
}

impl FromStr for Channel {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(Self::Email),
            "SMS" => Ok(Self::Sms),
            "WHATSAPP" => Ok(Self::Whatsapp),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Read,
    Failed,
    Cancelled,
}

impl DeliveryStatus {
    /// Progression rank used by the transition guard. `Failed` ranks
    /// below `Delivered` so that a send which was deferred and later
    /// delivered still ends up `Delivered`.
    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Failed => 1,
            Self::Delivered => 2,
            Self::Read => 3,
            Self::Cancelled => 0,
        }
    }

    /// Whether a provider callback carrying `next` may overwrite the
    /// current status. Transitions are monotonic: a status never moves
    /// to a lower rank, so an out-of-order `delivered` cannot undo a
    /// `read`. Re-applying the same status is allowed, which keeps
    /// webhook redelivery idempotent. `Cancelled` is terminal and only
    /// reachable from `Pending`.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        if *self == next {
            return true;
        }
        match (self, next) {
            (Self::Cancelled, _) => false,
            (Self::Pending, Self::Cancelled) => true,
            (_, Self::Cancelled) => false,
            (current, next) => next.rank() >= current.rank(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Delivered => "DELIVERED",
            Self::Read => "READ",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "DELIVERED" => Ok(Self::Delivered),
            "READ" => Ok(Self::Read),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

/// A scheduled or dispatched instance of a `WorkflowStep` for one
/// specific booking.
///
/// Rows are never physically deleted, cancellation is a status flag.
/// `booking_id` is `None` when the row was created by a delivery
/// webhook that arrived before the dispatcher persisted its record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReminder {
    pub id: ID,
    pub booking_id: Option<ID>,
    /// `None` for mandatory reminders, which are not backed by a step
    pub step_id: Option<ID>,
    /// Reference to the platform's event type, carried through to the
    /// delivery provider and echoed back by its webhooks
    pub event_type_id: Option<i64>,
    pub channel: Channel,
    pub status: DeliveryStatus,
    /// Absolute fire timestamp in millis
    pub remind_at: i64,
    /// Provider message id, the unique lookup key for reconciliation
    pub msg_id: Option<String>,
    pub is_mandatory: bool,
}

impl Entity for WorkflowReminder {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_reach_every_status() {
        for next in [
            DeliveryStatus::Delivered,
            DeliveryStatus::Read,
            DeliveryStatus::Failed,
            DeliveryStatus::Cancelled,
        ]
        .iter()
        {
            assert!(DeliveryStatus::Pending.can_transition_to(*next));
        }
    }

    #[test]
    fn read_is_not_regressed_by_out_of_order_delivered() {
        assert!(!DeliveryStatus::Read.can_transition_to(DeliveryStatus::Delivered));
        assert!(!DeliveryStatus::Read.can_transition_to(DeliveryStatus::Failed));
    }

    #[test]
    fn deferred_failure_can_still_be_delivered() {
        assert!(DeliveryStatus::Failed.can_transition_to(DeliveryStatus::Delivered));
        assert!(DeliveryStatus::Failed.can_transition_to(DeliveryStatus::Read));
    }

    #[test]
    fn redelivery_of_the_same_status_is_idempotent() {
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::Delivered,
            DeliveryStatus::Read,
            DeliveryStatus::Failed,
            DeliveryStatus::Cancelled,
        ]
        .iter()
        {
            assert!(status.can_transition_to(*status));
        }
    }

    #[test]
    fn cancelled_is_terminal_and_only_reachable_from_pending() {
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Cancelled));
        assert!(!DeliveryStatus::Delivered.can_transition_to(DeliveryStatus::Cancelled));
        assert!(!DeliveryStatus::Read.can_transition_to(DeliveryStatus::Cancelled));
        assert!(!DeliveryStatus::Cancelled.can_transition_to(DeliveryStatus::Delivered));
    }
}
