use crate::dtos::BookingDTO;
use chime_domain::{Attendee, Booking, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: BookingDTO,
}

impl BookingResponse {
    pub fn new(booking: Booking) -> Self {
        Self {
            booking: BookingDTO::new(booking),
        }
    }
}

pub mod create_booking {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
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
        /// Whether team members are locked out of applying their
        /// personal workflows to this booking. Defaults to locked.
        pub workflows_locked_for_user: Option<bool>,
    }

    pub type APIResponse = BookingResponse;
}

pub mod get_booking {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod cancel_booking {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = BookingResponse;
}
