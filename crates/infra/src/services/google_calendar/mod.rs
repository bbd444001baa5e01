use super::{ICalendarWatchProvider, WatchChannel};
use crate::config::GoogleWatchConfig;
use anyhow::anyhow;
use chime_domain::SelectedCalendar;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Client for the google calendar push notification api. A watch
/// registers a webhook channel for a calendar, a stop discards it.
pub struct GoogleCalendarWatchClient {
    client: Client,
    config: Option<GoogleWatchConfig>,
}

impl GoogleCalendarWatchClient {
    pub fn new(config: Option<GoogleWatchConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn config(&self) -> anyhow::Result<&GoogleWatchConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| anyhow!("Google calendar credentials are missing from the environment"))
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        body: &impl Serialize,
        path: &str,
    ) -> anyhow::Result<T> {
        let api_token = &self.config()?.api_token;
        match self
            .client
            .post(&format!("{}/{}", GOOGLE_API_BASE_URL, path))
            .header("authorization", format!("Bearer {}", api_token))
            .json(body)
            .send()
            .await
        {
            Ok(res) => res.json::<T>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!(
                    "[Network Error] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }

    /// For endpoints answering 204 with an empty body
    async fn post_no_content(&self, body: &impl Serialize, path: &str) -> anyhow::Result<()> {
        let api_token = &self.config()?.api_token;
        match self
            .client
            .post(&format!("{}/{}", GOOGLE_API_BASE_URL, path))
            .header("authorization", format!("Bearer {}", api_token))
            .json(body)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => Ok(()),
            Ok(res) => {
                error!(
                    "[Unexpected Response] Google Calendar API POST error. Status code: {}",
                    res.status()
                );
                Err(anyhow!("Google Calendar API error: {}", res.status()))
            }
            Err(e) => {
                error!(
                    "[Network Error] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchRequest {
    id: String,
    #[serde(rename = "type")]
    channel_type: String,
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchResponse {
    id: String,
    /// Millis timestamp encoded as a string
    expiration: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StopChannelRequest {
    id: String,
}

#[async_trait::async_trait]
impl ICalendarWatchProvider for GoogleCalendarWatchClient {
    async fn watch(&self, calendar: &SelectedCalendar) -> anyhow::Result<WatchChannel> {
        let receiver_url = self.config()?.webhook_receiver_url.clone();
        let request = WatchRequest {
            id: Uuid::new_v4().to_string(),
            channel_type: "web_hook".into(),
            address: receiver_url,
        };
        let response: WatchResponse = self
            .post(
                &request,
                &format!("calendars/{}/events/watch", calendar.external_id),
            )
            .await?;

        let expiration = response
            .expiration
            .parse::<i64>()
            .map_err(|_| anyhow!("Malformed channel expiration: {}", response.expiration))?;

        Ok(WatchChannel {
            channel_id: response.id,
            expiration,
        })
    }

    async fn unwatch(&self, calendar: &SelectedCalendar) -> anyhow::Result<()> {
        let channel_id = calendar
            .channel_id
            .clone()
            .ok_or_else(|| anyhow!("Calendar {} has no watch channel", calendar.id))?;
        self.post_no_content(&StopChannelRequest { id: channel_id }, "channels/stop")
            .await
    }
}
