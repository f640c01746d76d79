use anyhow::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    clients::{MessageProvider, build_http_client, rejection, twilio::TwilioMessagesApi},
    config::Config,
    error::DispatchError,
    models::dispatch::OutboundMessage,
};

#[derive(Debug, Serialize)]
struct WhatsAppRequest<'a> {
    messaging_product: &'static str,
    to: String,
    #[serde(rename = "type")]
    kind: &'static str,
    text: WhatsAppText<'a>,
}

#[derive(Debug, Serialize)]
struct WhatsAppText<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct WhatsAppResponse {
    #[serde(default)]
    messages: Vec<WhatsAppMessageRef>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageRef {
    id: String,
}

/// WhatsApp Cloud API text sender.
pub struct WhatsAppCloudProvider {
    http_client: Client,
    base_url: String,
    phone_number_id: String,
    access_token: String,
}

impl WhatsAppCloudProvider {
    pub fn new(config: &Config) -> Result<Self, Error> {
        info!(phone_number_id = %config.whatsapp_phone_number_id, "WhatsApp client initialized");

        Ok(Self {
            http_client: build_http_client(config.provider_timeout_seconds)?,
            base_url: config.whatsapp_api_base_url.trim_end_matches('/').to_string(),
            phone_number_id: config.whatsapp_phone_number_id.clone(),
            access_token: config.whatsapp_access_token.clone(),
        })
    }
}

#[async_trait]
impl MessageProvider for WhatsAppCloudProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        let to: String = message
            .destination
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();

        debug!(to = %to, channel_type = %message.channel_type, "Sending WhatsApp message");

        let request = WhatsAppRequest {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: WhatsAppText {
                body: &message.content,
            },
        };

        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(DispatchError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let parsed: WhatsAppResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::ProviderMalformedResponse(e.to_string()))?;

        let id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| {
                DispatchError::ProviderMalformedResponse("response carried no message id".to_string())
            })?;

        info!(message_id = %id, "WhatsApp message sent successfully");
        Ok(id)
    }
}

/// Twilio WhatsApp sender, used when the Cloud API is not configured.
pub struct TwilioWhatsAppProvider {
    api: TwilioMessagesApi,
    from: String,
}

impl TwilioWhatsAppProvider {
    pub fn new(config: &Config) -> Result<Self, Error> {
        info!(account_sid = %config.twilio_account_sid, "Twilio WhatsApp client initialized");

        Ok(Self {
            api: TwilioMessagesApi::new(config)?,
            from: format!("whatsapp:{}", config.twilio_whatsapp_number),
        })
    }
}

#[async_trait]
impl MessageProvider for TwilioWhatsAppProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        debug!(to = %message.destination, channel_type = %message.channel_type, "Sending WhatsApp message via Twilio");

        let to = format!("whatsapp:{}", message.destination);
        let sid = self.api.create(&to, &self.from, &message.content, None).await?;

        info!(message_id = %sid, "Twilio WhatsApp message sent successfully");
        Ok(sid)
    }
}
