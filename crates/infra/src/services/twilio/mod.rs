use super::{ISmsProvider, ScheduledSms};
use crate::config::TwilioConfig;
use anyhow::anyhow;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use tracing::error;

const TWILIO_API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Thin client for the Twilio messages api, covering both sms and
/// whatsapp sends. Each send registers a status callback url carrying
/// the local msg id, the event type reference and the channel, which
/// the delivery webhooks reconcile on.
pub struct TwilioClient {
    client: Client,
    config: Option<TwilioConfig>,
    webapp_url: String,
}

impl TwilioClient {
    pub fn new(config: Option<TwilioConfig>, webapp_url: String) -> Self {
        Self {
            client: Client::new(),
            config,
            webapp_url,
        }
    }

    fn config(&self) -> anyhow::Result<&TwilioConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| anyhow!("Twilio credentials are missing from the environment"))
    }

    fn default_sender(&self, config: &TwilioConfig, whatsapp: bool) -> String {
        if whatsapp {
            format!(
                "whatsapp:{}",
                config
                    .whatsapp_phone_number
                    .clone()
                    .unwrap_or_else(|| config.phone_number.clone())
            )
        } else {
            config.phone_number.clone()
        }
    }

    fn status_callback_url(&self, sms: &ScheduledSms) -> String {
        let channel = if sms.whatsapp { "WHATSAPP" } else { "SMS" };
        let event_type_id = sms
            .event_type_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        format!(
            "{}/api/webhook/twilio?msgId={}&eventTypeId={}&channel={}",
            self.webapp_url, sms.msg_id, event_type_id, channel
        )
    }

    async fn post(&self, form: &[(&str, String)], path: &str) -> anyhow::Result<()> {
        let config = self.config()?;
        match self
            .client
            .post(&format!(
                "{}/Accounts/{}/{}",
                TWILIO_API_BASE_URL, config.account_sid, path
            ))
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .form(form)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => Ok(()),
            Ok(res) => {
                error!(
                    "[Unexpected Response] Twilio API POST error. Status code: {}",
                    res.status()
                );
                Err(anyhow!("Twilio API error: {}", res.status()))
            }
            Err(e) => {
                error!("[Network Error] Twilio API POST error. Error message: {:?}", e);
                Err(anyhow::Error::new(e))
            }
        }
    }
}

fn sms_number(phone: &str, whatsapp: bool) -> String {
    if whatsapp {
        format!("whatsapp:{}", phone)
    } else {
        phone.to_string()
    }
}

#[async_trait::async_trait]
impl ISmsProvider for TwilioClient {
    async fn schedule(&self, sms: &ScheduledSms) -> anyhow::Result<()> {
        let config = self.config()?;

        let from = match &sms.sender {
            Some(sender) if !sms.whatsapp => sender.clone(),
            _ => self.default_sender(config, sms.whatsapp),
        };

        let mut form = vec![
            ("To", sms_number(&sms.to, sms.whatsapp)),
            ("From", from),
            ("Body", sms.body.clone()),
            ("StatusCallback", self.status_callback_url(sms)),
        ];
        if let Some(messaging_service_sid) = &config.messaging_service_sid {
            form.push(("MessagingServiceSid", messaging_service_sid.clone()));
        }
        if let Some(send_at) = sms.send_at {
            form.push(("ScheduleType", "fixed".to_string()));
            form.push(("SendAt", Utc.timestamp_millis(send_at).to_rfc3339()));
        }

        self.post(&form, "Messages.json").await
    }

    async fn cancel_scheduled(&self, msg_id: &str) -> anyhow::Result<()> {
        let form = vec![("Status", "canceled".to_string())];
        self.post(&form, &format!("Messages/{}.json", msg_id)).await
    }
}
