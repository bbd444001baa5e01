mod inmemory;
mod postgres;

use chime_domain::{SelectedCalendar, ID};
pub use inmemory::InMemorySelectedCalendarRepo;
pub use postgres::PostgresSelectedCalendarRepo;

#[async_trait::async_trait]
pub trait ISelectedCalendarRepo: Send + Sync {
    async fn insert(&self, calendar: &SelectedCalendar) -> anyhow::Result<()>;
    async fn save(&self, calendar: &SelectedCalendar) -> anyhow::Result<()>;
    async fn find(&self, calendar_id: &ID) -> Option<SelectedCalendar>;
    /// Calendars with sync enabled whose watch channel is missing or
    /// expires within the renewal buffer, capped at the batch size
    async fn get_next_batch_to_watch(&self, now: i64) -> Vec<SelectedCalendar>;
    /// Calendars with sync disabled that still hold a watch channel,
    /// capped at the batch size
    async fn get_next_batch_to_unwatch(&self) -> Vec<SelectedCalendar>;
}
