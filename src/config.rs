use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;
use tracing::warn;

use crate::models::health::ServiceSummary;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_provider_timeout_seconds")]
    pub provider_timeout_seconds: u64,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from: String,

    #[serde(default = "default_whatsapp_api_base_url")]
    pub whatsapp_api_base_url: String,
    #[serde(default)]
    pub whatsapp_phone_number_id: String,
    #[serde(default)]
    pub whatsapp_access_token: String,

    #[serde(default = "default_telegram_api_base_url")]
    pub telegram_api_base_url: String,
    pub telegram_bot_token: String,

    #[serde(default = "default_twilio_api_base_url")]
    pub twilio_api_base_url: String,
    #[serde(default)]
    pub twilio_account_sid: String,
    #[serde(default)]
    pub twilio_auth_token: String,
    #[serde(default)]
    pub twilio_phone_number: String,
    #[serde(default)]
    pub twilio_whatsapp_number: String,
    pub twilio_status_callback_url: Option<String>,

    #[serde(default = "default_fast2sms_api_base_url")]
    pub fast2sms_api_base_url: String,
    #[serde(default)]
    pub fast2sms_api_key: String,
    #[serde(default)]
    pub fast2sms_sender_id: String,

    #[serde(default = "default_karma_tracker_base_url")]
    pub karma_tracker_base_url: String,
    pub karma_tracker_api_key: String,
}

fn default_server_port() -> u16 {
    3000
}

fn default_provider_timeout_seconds() -> u64 {
    10
}

fn default_smtp_host() -> String {
    "smtp.zoho.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_whatsapp_api_base_url() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

fn default_telegram_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_twilio_api_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_fast2sms_api_base_url() -> String {
    "https://www.fast2sms.com".to_string()
}

fn default_karma_tracker_base_url() -> String {
    "https://karma-tracker-api.example.com".to_string()
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects required credentials that are blank, naming every offender.
    /// Channels without any complete provider only produce a warning.
    pub fn validate(&self) -> Result<(), Error> {
        let missing: Vec<&str> = self
            .required_values()
            .into_iter()
            .filter(|(_, value)| !is_set(value))
            .map(|(name, _)| name)
            .collect();

        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        for warning in self.warnings() {
            warn!("{}", warning);
        }

        Ok(())
    }

    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if !self.has_twilio_sms() && !self.has_fast2sms() {
            warnings.push("No SMS provider configured. At least one of Twilio or Fast2SMS must be set up.");
        }
        if !self.has_whatsapp_cloud() && !self.has_twilio_whatsapp() {
            warnings.push("No WhatsApp provider configured. At least one WhatsApp service must be set up.");
        }
        warnings
    }

    pub fn has_twilio_sms(&self) -> bool {
        self.has_twilio_account() && is_set(&self.twilio_phone_number)
    }

    pub fn has_fast2sms(&self) -> bool {
        is_set(&self.fast2sms_api_key)
    }

    pub fn has_whatsapp_cloud(&self) -> bool {
        is_set(&self.whatsapp_phone_number_id) && is_set(&self.whatsapp_access_token)
    }

    pub fn has_twilio_whatsapp(&self) -> bool {
        self.has_twilio_account() && is_set(&self.twilio_whatsapp_number)
    }

    fn has_twilio_account(&self) -> bool {
        is_set(&self.twilio_account_sid) && is_set(&self.twilio_auth_token)
    }

    pub fn summary(&self) -> ServiceSummary {
        ServiceSummary {
            email: is_set(&self.email_from) && is_set(&self.smtp_username),
            whatsapp: self.has_whatsapp_cloud() || self.has_twilio_whatsapp(),
            telegram: is_set(&self.telegram_bot_token),
            sms: self.has_twilio_sms() || self.has_fast2sms(),
            karma_tracker: is_set(&self.karma_tracker_api_key),
        }
    }

    fn required_values(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("SMTP_USERNAME", self.smtp_username.as_str()),
            ("SMTP_PASSWORD", self.smtp_password.as_str()),
            ("EMAIL_FROM", self.email_from.as_str()),
            ("TELEGRAM_BOT_TOKEN", self.telegram_bot_token.as_str()),
            ("KARMA_TRACKER_API_KEY", self.karma_tracker_api_key.as_str()),
        ]
    }
}

fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}
