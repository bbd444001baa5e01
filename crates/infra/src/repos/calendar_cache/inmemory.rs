use super::ICalendarCacheRepo;
use crate::repos::shared::inmemory_repo::*;
use crate::repos::shared::repo::DeleteResult;
use chime_domain::CalendarCacheEntry;

pub struct InMemoryCalendarCacheRepo {
    entries: std::sync::Mutex<Vec<CalendarCacheEntry>>,
}

impl InMemoryCalendarCacheRepo {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ICalendarCacheRepo for InMemoryCalendarCacheRepo {
    async fn insert(&self, entry: &CalendarCacheEntry) -> anyhow::Result<()> {
        insert(entry, &self.entries);
        Ok(())
    }

    async fn delete_all_expired(&self, now: i64) -> DeleteResult {
        delete_by(&self.entries, |e: &CalendarCacheEntry| e.expires_at <= now)
    }
}
