mod inmemory;
mod postgres;

use crate::repos::shared::repo::DeleteResult;
use chime_domain::CalendarCacheEntry;
pub use inmemory::InMemoryCalendarCacheRepo;
pub use postgres::PostgresCalendarCacheRepo;

#[async_trait::async_trait]
pub trait ICalendarCacheRepo: Send + Sync {
    async fn insert(&self, entry: &CalendarCacheEntry) -> anyhow::Result<()>;
    async fn delete_all_expired(&self, now: i64) -> DeleteResult;
}
