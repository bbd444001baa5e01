use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// How long before a watch channel expires it becomes eligible for
/// renewal.
pub const WATCH_EXPIRATION_BUFFER_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Lifetime the provider grants a newly established watch channel.
pub const WATCH_CHANNEL_TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Max number of calendars a single cron tick will transition.
pub const WATCH_BATCH_SIZE: i64 = 100;

/// A per-user subscription to an external calendar.
///
/// The watch cron drives each row through
/// `{not watched} -> watch() -> {watched}` with renewal before the
/// channel expires, or `{watched, sync disabled} -> unwatch() ->
/// {not watched}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCalendar {
    pub id: ID,
    pub user_id: ID,
    /// Provider integration slug, e.g. `google_calendar`
    pub integration: String,
    /// The calendar id at the provider
    pub external_id: String,
    pub channel_id: Option<String>,
    pub channel_expiration: Option<i64>,
    pub sync_enabled: bool,
}

impl SelectedCalendar {
    /// A calendar needs a (re)watch when sync is on and there is no
    /// channel or the channel expires within the renewal buffer.
    pub fn needs_watch(&self, now: i64) -> bool {
        if !self.sync_enabled {
            return false;
        }
        match self.channel_expiration {
            None => true,
            Some(expiration) => expiration - now <= WATCH_EXPIRATION_BUFFER_MILLIS,
        }
    }

    pub fn needs_unwatch(&self) -> bool {
        !self.sync_enabled && self.channel_id.is_some()
    }
}

impl Entity for SelectedCalendar {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// A cached availability payload for an external calendar, dropped by
/// the cleanup cron once expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCacheEntry {
    pub id: ID,
    pub key: String,
    pub value: serde_json::Value,
    pub expires_at: i64,
}

impl Entity for CalendarCacheEntry {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
