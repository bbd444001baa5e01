mod booking;
mod calendar_cache;
mod selected_calendar;
mod shared;
mod workflow;
mod workflow_reminder;

use booking::{IBookingRepo, InMemoryBookingRepo, PostgresBookingRepo};
use calendar_cache::{ICalendarCacheRepo, InMemoryCalendarCacheRepo, PostgresCalendarCacheRepo};
use selected_calendar::{
    ISelectedCalendarRepo, InMemorySelectedCalendarRepo, PostgresSelectedCalendarRepo,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use workflow::{IWorkflowRepo, InMemoryWorkflowRepo, PostgresWorkflowRepo};
use workflow_reminder::{
    IWorkflowReminderRepo, InMemoryWorkflowReminderRepo, PostgresWorkflowReminderRepo,
};

pub use shared::repo::DeleteResult;

#[derive(Clone)]
pub struct Repos {
    pub bookings: Arc<dyn IBookingRepo>,
    pub workflows: Arc<dyn IWorkflowRepo>,
    pub workflow_reminders: Arc<dyn IWorkflowReminderRepo>,
    pub selected_calendars: Arc<dyn ISelectedCalendarRepo>,
    pub calendar_cache: Arc<dyn ICalendarCacheRepo>,
}

impl Repos {
    pub async fn create_postgres(
        connection_string: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            workflows: Arc::new(PostgresWorkflowRepo::new(pool.clone())),
            workflow_reminders: Arc::new(PostgresWorkflowReminderRepo::new(pool.clone())),
            selected_calendars: Arc::new(PostgresSelectedCalendarRepo::new(pool.clone())),
            calendar_cache: Arc::new(PostgresCalendarCacheRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            bookings: Arc::new(InMemoryBookingRepo::new()),
            workflows: Arc::new(InMemoryWorkflowRepo::new()),
            workflow_reminders: Arc::new(InMemoryWorkflowReminderRepo::new()),
            selected_calendars: Arc::new(InMemorySelectedCalendarRepo::new()),
            calendar_cache: Arc::new(InMemoryCalendarCacheRepo::new()),
        }
    }
}
