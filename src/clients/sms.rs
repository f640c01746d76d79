use anyhow::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    clients::{MessageProvider, build_http_client, rejection, twilio::TwilioMessagesApi},
    config::Config,
    error::DispatchError,
    models::{dispatch::OutboundMessage, payload::escape_html, validation::SMS_MESSAGE_MAX},
};

pub const URGENT_PREFIX: &str = "URGENT: ";

/// Fits a body into a single SMS segment, marking the cut with "...".
pub fn truncate_for_sms(message: &str) -> String {
    if message.chars().count() <= SMS_MESSAGE_MAX {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(SMS_MESSAGE_MAX - 3).collect();
    truncated.push_str("...");
    truncated
}

/// Outcome for one recipient of a bulk send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSmsResult {
    pub to: String,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Twilio Programmable Messaging sender. `channel_type == "urgent"` sends
/// with the urgent prefix and the configured status callback.
pub struct TwilioSmsProvider {
    api: TwilioMessagesApi,
    from_number: String,
    status_callback_url: Option<String>,
}

impl TwilioSmsProvider {
    pub fn new(config: &Config) -> Result<Self, Error> {
        info!(account_sid = %config.twilio_account_sid, "Twilio SMS client initialized");

        Ok(Self {
            api: TwilioMessagesApi::new(config)?,
            from_number: config.twilio_phone_number.clone(),
            status_callback_url: config
                .twilio_status_callback_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
        })
    }

    pub async fn send_urgent(&self, to: &str, message: &str) -> Result<String, DispatchError> {
        let body = truncate_for_sms(&format!("{}{}", URGENT_PREFIX, message));
        let sid = self
            .api
            .create(to, &self.from_number, &body, self.status_callback_url.as_deref())
            .await?;

        info!(message_id = %sid, "Urgent SMS sent successfully");
        Ok(sid)
    }

    /// Sends the same body to each recipient in turn. One recipient failing
    /// does not stop the rest.
    pub async fn send_bulk(&self, recipients: &[String], message: &str) -> Vec<BulkSmsResult> {
        let body = truncate_for_sms(message);
        let mut results = Vec::with_capacity(recipients.len());

        for to in recipients {
            let result = match self.api.create(to, &self.from_number, &body, None).await {
                Ok(sid) => BulkSmsResult {
                    to: to.clone(),
                    success: true,
                    message_id: Some(sid),
                    error: None,
                },
                Err(e) => {
                    warn!(to = %escape_html(to), error = %e, "Bulk SMS recipient failed");
                    BulkSmsResult {
                        to: to.clone(),
                        success: false,
                        message_id: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        info!(
            account_sid = %self.api.account_sid(),
            sent = results.iter().filter(|r| r.success).count(),
            total = results.len(),
            "Bulk SMS finished"
        );
        results
    }
}

#[async_trait]
impl MessageProvider for TwilioSmsProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        debug!(to = %message.destination, channel_type = %message.channel_type, "Sending SMS");

        if message.channel_type == "urgent" {
            return self.send_urgent(&message.destination, &message.content).await;
        }

        let body = truncate_for_sms(&message.content);
        let sid = self
            .api
            .create(&message.destination, &self.from_number, &body, None)
            .await?;

        info!(message_id = %sid, "SMS sent successfully");
        Ok(sid)
    }
}

#[derive(Debug, Serialize)]
struct Fast2SmsRequest<'a> {
    route: &'static str,
    sender_id: &'a str,
    message: &'a str,
    language: &'static str,
    flash: u8,
    numbers: &'a str,
}

#[derive(Debug, Deserialize)]
struct Fast2SmsResponse {
    #[serde(rename = "return")]
    accepted: bool,

    #[serde(default)]
    request_id: Option<String>,

    #[serde(default)]
    message: Option<serde_json::Value>,
}

/// Fast2SMS bulk API sender, used when Twilio is not configured.
pub struct Fast2SmsProvider {
    http_client: Client,
    base_url: String,
    api_key: String,
    sender_id: String,
}

impl Fast2SmsProvider {
    pub fn new(config: &Config) -> Result<Self, Error> {
        info!("Fast2SMS client initialized");

        Ok(Self {
            http_client: build_http_client(config.provider_timeout_seconds)?,
            base_url: config.fast2sms_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.fast2sms_api_key.clone(),
            sender_id: config.fast2sms_sender_id.clone(),
        })
    }
}

#[async_trait]
impl MessageProvider for Fast2SmsProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        debug!(to = %message.destination, channel_type = %message.channel_type, "Sending SMS via Fast2SMS");

        let request = Fast2SmsRequest {
            route: "v3",
            sender_id: &self.sender_id,
            message: &message.content,
            language: "english",
            flash: 0,
            numbers: &message.destination,
        };

        let response = self
            .http_client
            .post(format!("{}/dev/bulkV2", self.base_url))
            .header("authorization", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(DispatchError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let parsed: Fast2SmsResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::ProviderMalformedResponse(e.to_string()))?;

        if !parsed.accepted {
            let reason = parsed
                .message
                .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                .unwrap_or_else(|| "Fast2SMS API returned false".to_string());
            return Err(DispatchError::ProviderRejected(reason));
        }

        let id = parsed.request_id.ok_or_else(|| {
            DispatchError::ProviderMalformedResponse("response carried no request_id".to_string())
        })?;

        info!(message_id = %id, "Fast2SMS message sent successfully");
        Ok(id)
    }
}
