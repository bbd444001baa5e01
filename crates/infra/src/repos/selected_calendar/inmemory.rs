use super::ISelectedCalendarRepo;
use crate::repos::shared::inmemory_repo::*;
use chime_domain::{SelectedCalendar, ID, WATCH_BATCH_SIZE};

pub struct InMemorySelectedCalendarRepo {
    calendars: std::sync::Mutex<Vec<SelectedCalendar>>,
}

impl InMemorySelectedCalendarRepo {
    pub fn new() -> Self {
        Self {
            calendars: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISelectedCalendarRepo for InMemorySelectedCalendarRepo {
    async fn insert(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        insert(calendar, &self.calendars);
        Ok(())
    }

    async fn save(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        save(calendar, &self.calendars);
        Ok(())
    }

    async fn find(&self, calendar_id: &ID) -> Option<SelectedCalendar> {
        find(calendar_id, &self.calendars)
    }

    async fn get_next_batch_to_watch(&self, now: i64) -> Vec<SelectedCalendar> {
        find_by(&self.calendars, |c: &SelectedCalendar| c.needs_watch(now))
            .into_iter()
            .take(WATCH_BATCH_SIZE as usize)
            .collect()
    }

    async fn get_next_batch_to_unwatch(&self) -> Vec<SelectedCalendar> {
        find_by(&self.calendars, |c: &SelectedCalendar| c.needs_unwatch())
            .into_iter()
            .take(WATCH_BATCH_SIZE as usize)
            .collect()
    }
}
