use chime_domain::{Attendee, Booking, BookingStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingDTO {
    pub id: ID,
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

impl BookingDTO {
    pub fn new(booking: Booking) -> Self {
        Self {
            id: booking.id.clone(),
            event_type_id: booking.event_type_id,
            user_id: booking.user_id.clone(),
            host_email: booking.host_email,
            host_name: booking.host_name,
            team_id: booking.team_id.clone(),
            org_id: booking.org_id.clone(),
            title: booking.title,
            start_ts: booking.start_ts,
            end_ts: booking.end_ts,
            attendees: booking.attendees,
            status: booking.status,
            created: booking.created,
            updated: booking.updated,
        }
    }
}
