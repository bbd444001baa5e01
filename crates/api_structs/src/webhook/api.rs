use chime_domain::Channel;
use serde::{Deserialize, Serialize};

/// Positive acknowledgement returned to a delivery provider.
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

impl WebhookAck {
    pub fn new() -> Self {
        Self { success: true }
    }
}

impl Default for WebhookAck {
    fn default() -> Self {
        Self::new()
    }
}

/// Soft rejection body. Returned with a 200 so the provider does not
/// keep retrying events we deliberately ignore.
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookError {
    pub error: String,
}

impl WebhookError {
    pub fn status_not_handled() -> Self {
        Self {
            error: "Status not handled".into(),
        }
    }
}

pub mod sendgrid_webhook {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub msg_id: String,
        pub event: String,
        pub event_type_id: i64,
    }

    pub type APIResponse = WebhookAck;
}

pub mod twilio_webhook {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub msg_id: String,
        pub event_type_id: i64,
        /// `SMS` or `WHATSAPP`, set by the status callback url the
        /// dispatcher registered with the provider
        pub channel: Channel,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestBody {
        pub status: String,
    }

    pub type APIResponse = WebhookAck;
}
