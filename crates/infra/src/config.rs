use chime_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SendgridConfig {
    pub api_key: String,
    /// Default sender address for outgoing workflow emails
    pub sender_email: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub messaging_service_sid: Option<String>,
    pub phone_number: String,
    pub whatsapp_phone_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleWatchConfig {
    /// Bearer token used for the calendar watch api. Token refresh is
    /// owned by the platform's credential service.
    pub api_token: String,
    /// Public url the provider pushes calendar change notifications to
    pub webhook_receiver_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Bearer token required by the cron endpoints
    pub cron_secret: String,
    /// Public base url of this service, used to build the delivery
    /// status callback urls handed to the sms provider
    pub webapp_url: String,
    pub sendgrid: Option<SendgridConfig>,
    pub twilio: Option<TwilioConfig>,
    pub google: Option<GoogleWatchConfig>,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or(default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let cron_secret = match std::env::var("CRON_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find CRON_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(32);
                info!(
                    "Secret code for triggering the cron endpoints was generated and set to: {}",
                    secret
                );
                secret
            }
        };

        let webapp_url =
            std::env::var("WEBAPP_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

        let sendgrid = match (
            std::env::var("SENDGRID_API_KEY"),
            std::env::var("SENDGRID_EMAIL"),
        ) {
            (Ok(api_key), Ok(sender_email)) => Some(SendgridConfig {
                api_key,
                sender_email,
            }),
            _ => {
                info!("SendGrid credentials not given. Email sending will be disabled.");
                None
            }
        };

        let twilio = match (
            std::env::var("TWILIO_SID"),
            std::env::var("TWILIO_TOKEN"),
            std::env::var("TWILIO_PHONE_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(phone_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                messaging_service_sid: std::env::var("TWILIO_MESSAGING_SID").ok(),
                phone_number,
                whatsapp_phone_number: std::env::var("TWILIO_WHATSAPP_PHONE_NUMBER").ok(),
            }),
            _ => {
                info!("Twilio credentials not given. SMS and WhatsApp sending will be disabled.");
                None
            }
        };

        let google = match (
            std::env::var("GOOGLE_API_TOKEN"),
            std::env::var("GOOGLE_WEBHOOK_RECEIVER_URL"),
        ) {
            (Ok(api_token), Ok(webhook_receiver_url)) => Some(GoogleWatchConfig {
                api_token,
                webhook_receiver_url,
            }),
            _ => {
                info!("Google calendar credentials not given. Calendar watching will be disabled.");
                None
            }
        };

        Self {
            port,
            cron_secret,
            webapp_url,
            sendgrid,
            twilio,
            google,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
