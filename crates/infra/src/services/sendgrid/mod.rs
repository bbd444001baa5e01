use super::{IEmailProvider, ScheduledEmail};
use crate::config::SendgridConfig;
use anyhow::anyhow;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

const SENDGRID_API_BASE_URL: &str = "https://api.sendgrid.com/v3";

/// Thin client for the SendGrid mail send api. Scheduled sends are
/// keyed by a batch id so they can be cancelled later, and the local
/// msg id travels as a custom arg which SendGrid echoes back on every
/// event webhook.
pub struct SendgridClient {
    client: Client,
    config: Option<SendgridConfig>,
}

impl SendgridClient {
    pub fn new(config: Option<SendgridConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn config(&self) -> anyhow::Result<&SendgridConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| anyhow!("SendGrid credentials are missing from the environment"))
    }

    async fn post(&self, body: &impl Serialize, path: &str) -> anyhow::Result<()> {
        let api_key = &self.config()?.api_key;
        match self
            .client
            .post(&format!("{}/{}", SENDGRID_API_BASE_URL, path))
            .header("authorization", format!("Bearer {}", api_key))
            .json(body)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => Ok(()),
            Ok(res) => {
                error!(
                    "[Unexpected Response] SendGrid API POST error. Status code: {}",
                    res.status()
                );
                Err(anyhow!("SendGrid API error: {}", res.status()))
            }
            Err(e) => {
                error!("[Network Error] SendGrid API POST error. Error message: {:?}", e);
                Err(anyhow::Error::new(e))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct MailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct MailPersonalization {
    to: Vec<MailAddress>,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct MailSendRequest {
    personalizations: Vec<MailPersonalization>,
    from: MailAddress,
    subject: String,
    content: Vec<MailContent>,
    custom_args: HashMap<String, String>,
    batch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_at: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CancelScheduledSendRequest {
    batch_id: String,
    status: String,
}

#[async_trait::async_trait]
impl IEmailProvider for SendgridClient {
    async fn schedule(&self, email: &ScheduledEmail) -> anyhow::Result<()> {
        let sender_email = self.config()?.sender_email.clone();
        let mut custom_args = HashMap::new();
        custom_args.insert("msgId".to_string(), email.msg_id.clone());
        if let Some(event_type_id) = email.event_type_id {
            custom_args.insert("eventTypeId".to_string(), event_type_id.to_string());
        }

        let request = MailSendRequest {
            personalizations: vec![MailPersonalization {
                to: email
                    .to
                    .iter()
                    .map(|email| MailAddress {
                        email: email.clone(),
                    })
                    .collect(),
            }],
            from: MailAddress {
                email: email.sender.clone().unwrap_or(sender_email),
            },
            subject: email.subject.clone(),
            content: vec![MailContent {
                content_type: "text/html".into(),
                value: email.body.clone(),
            }],
            custom_args,
            batch_id: email.msg_id.clone(),
            // SendGrid takes the send timestamp in unix seconds
            send_at: email.send_at.map(|millis| millis / 1000),
        };

        self.post(&request, "mail/send").await
    }

    async fn cancel_scheduled(&self, msg_id: &str) -> anyhow::Result<()> {
        let request = CancelScheduledSendRequest {
            batch_id: msg_id.to_string(),
            status: "cancel".into(),
        };
        self.post(&request, "user/scheduled_sends").await
    }
}
