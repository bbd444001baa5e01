mod google_calendar;
mod inmemory;
mod sendgrid;
mod twilio;

use crate::config::Config;
use chime_domain::SelectedCalendar;
use std::sync::Arc;

pub use google_calendar::GoogleCalendarWatchClient;
pub use inmemory::{InMemoryCalendarWatchProvider, InMemoryEmailProvider, InMemorySmsProvider};
pub use sendgrid::SendgridClient;
pub use twilio::TwilioClient;

/// An email send handed to the delivery provider, possibly scheduled
/// for a future timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    /// Overrides the configured default sender
    pub sender: Option<String>,
    /// Absolute send timestamp in millis. `None` sends immediately.
    pub send_at: Option<i64>,
    /// Reference id echoed back by the provider's event webhooks
    pub msg_id: String,
    pub event_type_id: Option<i64>,
    pub include_calendar_event: bool,
}

/// An sms or whatsapp send handed to the phone-messaging provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSms {
    pub to: String,
    pub body: String,
    pub sender: Option<String>,
    pub send_at: Option<i64>,
    pub whatsapp: bool,
    /// Reference id carried on the status callback url
    pub msg_id: String,
    pub event_type_id: Option<i64>,
}

/// A newly established calendar watch channel at the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchChannel {
    pub channel_id: String,
    /// Timestamp in millis at which the provider drops the channel
    pub expiration: i64,
}

#[async_trait::async_trait]
pub trait IEmailProvider: Send + Sync {
    async fn schedule(&self, email: &ScheduledEmail) -> anyhow::Result<()>;
    async fn cancel_scheduled(&self, msg_id: &str) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait ISmsProvider: Send + Sync {
    async fn schedule(&self, sms: &ScheduledSms) -> anyhow::Result<()>;
    async fn cancel_scheduled(&self, msg_id: &str) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait ICalendarWatchProvider: Send + Sync {
    async fn watch(&self, calendar: &SelectedCalendar) -> anyhow::Result<WatchChannel>;
    async fn unwatch(&self, calendar: &SelectedCalendar) -> anyhow::Result<()>;
}

/// The delivery and calendar provider clients, constructed once at
/// startup and handed to the request handlers through the context.
#[derive(Clone)]
pub struct Providers {
    pub email: Arc<dyn IEmailProvider>,
    pub sms: Arc<dyn ISmsProvider>,
    pub calendar: Arc<dyn ICalendarWatchProvider>,
}

impl Providers {
    pub fn create(config: &Config) -> Self {
        Self {
            email: Arc::new(SendgridClient::new(config.sendgrid.clone())),
            sms: Arc::new(TwilioClient::new(
                config.twilio.clone(),
                config.webapp_url.clone(),
            )),
            calendar: Arc::new(GoogleCalendarWatchClient::new(config.google.clone())),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            email: Arc::new(InMemoryEmailProvider::new()),
            sms: Arc::new(InMemorySmsProvider::new()),
            calendar: Arc::new(InMemoryCalendarWatchProvider::new()),
        }
    }
}
