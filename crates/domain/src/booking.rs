use crate::shared::entity::{Entity, ID};
use crate::workflow::InvalidEnumValueError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Set when the host marks this attendee as a no-show
    #[serde(default)]
    pub no_show: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = InvalidEnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(InvalidEnumValueError(s.to_string())),
        }
    }
}

/// One confirmed occurrence of an event type, the anchor for all
/// reminder scheduling.
///
/// The owning scope chain (`user_id`, `team_id`, `org_id`) is
/// denormalized onto the booking so that workflow resolution does not
/// need the platform's membership tables at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: ID,
    /// Reference to the platform's event type, if the booking was made
    /// through one
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
    pub status: BookingStatus,
    pub created: i64,
    pub updated: i64,
}

impl Entity for Booking {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
