mod booking;
mod calendar_sync;
mod reminder;
mod shared;
mod workflow;

pub use booking::{Attendee, Booking, BookingStatus};
pub use calendar_sync::{
    CalendarCacheEntry, SelectedCalendar, WATCH_BATCH_SIZE, WATCH_CHANNEL_TTL_MILLIS,
    WATCH_EXPIRATION_BUFFER_MILLIS,
};
pub use reminder::{Channel, DeliveryStatus, WorkflowReminder};
pub use shared::entity::{Entity, ID};
pub use workflow::{
    reminder_fire_time, InvalidEnumValueError, TimeUnit, TriggerOffset, Workflow, WorkflowAction,
    WorkflowStep, WorkflowTemplate, WorkflowTrigger,
};
