use super::{
    ICalendarWatchProvider, IEmailProvider, ISmsProvider, ScheduledEmail, ScheduledSms,
    WatchChannel,
};
use anyhow::anyhow;
use chime_domain::{SelectedCalendar, WATCH_CHANNEL_TTL_MILLIS};
use std::sync::Mutex;
use uuid::Uuid;

/// Test double recording every scheduled email instead of calling the
/// provider. Recipients listed in `failing_recipients` make the
/// schedule call fail, so dispatch error handling can be exercised.
pub struct InMemoryEmailProvider {
    pub sent: Mutex<Vec<ScheduledEmail>>,
    pub cancelled: Mutex<Vec<String>>,
    pub failing_recipients: Mutex<Vec<String>>,
}

impl InMemoryEmailProvider {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            failing_recipients: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEmailProvider for InMemoryEmailProvider {
    async fn schedule(&self, email: &ScheduledEmail) -> anyhow::Result<()> {
        let failing = self.failing_recipients.lock().unwrap();
        if email.to.iter().any(|to| failing.contains(to)) {
            return Err(anyhow!("Email provider rejected recipient"));
        }
        drop(failing);
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }

    async fn cancel_scheduled(&self, msg_id: &str) -> anyhow::Result<()> {
        self.cancelled.lock().unwrap().push(msg_id.to_string());
        Ok(())
    }
}

pub struct InMemorySmsProvider {
    pub sent: Mutex<Vec<ScheduledSms>>,
    pub cancelled: Mutex<Vec<String>>,
}

impl InMemorySmsProvider {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISmsProvider for InMemorySmsProvider {
    async fn schedule(&self, sms: &ScheduledSms) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(sms.clone());
        Ok(())
    }

    async fn cancel_scheduled(&self, msg_id: &str) -> anyhow::Result<()> {
        self.cancelled.lock().unwrap().push(msg_id.to_string());
        Ok(())
    }
}

/// Test double handing out synthetic watch channels. Calendars listed
/// in `failing_calendars` make the watch or unwatch call fail.
pub struct InMemoryCalendarWatchProvider {
    pub now: Mutex<i64>,
    pub watched: Mutex<Vec<String>>,
    pub unwatched: Mutex<Vec<String>>,
    pub failing_calendars: Mutex<Vec<String>>,
}

impl InMemoryCalendarWatchProvider {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(0),
            watched: Mutex::new(Vec::new()),
            unwatched: Mutex::new(Vec::new()),
            failing_calendars: Mutex::new(Vec::new()),
        }
    }

    fn check_failing(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        if self
            .failing_calendars
            .lock()
            .unwrap()
            .contains(&calendar.external_id)
        {
            return Err(anyhow!(
                "Calendar provider rejected calendar {}",
                calendar.external_id
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ICalendarWatchProvider for InMemoryCalendarWatchProvider {
    async fn watch(&self, calendar: &SelectedCalendar) -> anyhow::Result<WatchChannel> {
        self.check_failing(calendar)?;
        self.watched
            .lock()
            .unwrap()
            .push(calendar.external_id.clone());
        let now = *self.now.lock().unwrap();
        Ok(WatchChannel {
            channel_id: Uuid::new_v4().to_string(),
            expiration: now + WATCH_CHANNEL_TTL_MILLIS,
        })
    }

    async fn unwatch(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        self.check_failing(calendar)?;
        self.unwatched
            .lock()
            .unwrap()
            .push(calendar.external_id.clone());
        Ok(())
    }
}
