use anyhow::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
    clients::{MessageProvider, build_http_client},
    config::Config,
    error::DispatchError,
    models::dispatch::OutboundMessage,
};

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    result: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
}

/// Telegram Bot API sender.
pub struct TelegramBotProvider {
    http_client: Client,
    base_url: String,
    bot_token: String,
}

impl TelegramBotProvider {
    pub fn new(config: &Config) -> Result<Self, Error> {
        info!("Telegram client initialized");

        Ok(Self {
            http_client: build_http_client(config.provider_timeout_seconds)?,
            base_url: config.telegram_api_base_url.trim_end_matches('/').to_string(),
            bot_token: config.telegram_bot_token.clone(),
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.bot_token)
    }
}

/// Command responses get a one-time reply keyboard with the bot's commands.
fn command_keyboard() -> Value {
    json!({
        "keyboard": [
            [{ "text": "/status" }, { "text": "/help" }],
            [{ "text": "/orders" }, { "text": "/support" }]
        ],
        "resize_keyboard": true,
        "one_time_keyboard": true
    })
}

/// One inline button on a quick notification; `callback_data` comes back in
/// the callback query when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickButton {
    pub text: String,
    pub callback_data: String,
}

impl TelegramBotProvider {
    /// Markdown-titled notification with one inline button per row.
    pub async fn send_quick_notification(
        &self,
        chat_id: &str,
        title: &str,
        message: &str,
        buttons: &[QuickButton],
    ) -> Result<String, DispatchError> {
        let inline_keyboard: Vec<Value> = buttons
            .iter()
            .map(|b| json!([{ "text": b.text, "callback_data": b.callback_data }]))
            .collect();

        let body = json!({
            "chat_id": chat_id,
            "text": format!("*{}*\n\n{}", title, message),
            "parse_mode": "Markdown",
            "reply_markup": { "inline_keyboard": inline_keyboard },
        });

        debug!(chat_id = %chat_id, buttons = buttons.len(), "Sending Telegram quick notification");
        self.post_message(&body).await
    }

    async fn post_message(&self, body: &Value) -> Result<String, DispatchError> {
        let response = self
            .http_client
            .post(self.api_url("sendMessage"))
            .json(body)
            .send()
            .await
            .map_err(DispatchError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(DispatchError::from_reqwest)?;

        // The Bot API reports rejections in the body as well as the status.
        let parsed = serde_json::from_str::<TelegramResponse>(&text);

        if !status.is_success() {
            let description = parsed
                .ok()
                .and_then(|r| r.description)
                .unwrap_or_else(|| format!("{}: {}", status, text));
            return Err(DispatchError::ProviderRejected(description));
        }

        let parsed = parsed.map_err(|e| DispatchError::ProviderMalformedResponse(e.to_string()))?;

        if !parsed.ok {
            let description = parsed
                .description
                .unwrap_or_else(|| "Telegram API returned ok=false".to_string());
            return Err(DispatchError::ProviderRejected(description));
        }

        let id = parsed
            .result
            .map(|m| m.message_id.to_string())
            .ok_or_else(|| {
                DispatchError::ProviderMalformedResponse("response carried no message_id".to_string())
            })?;

        info!(message_id = %id, "Telegram message sent successfully");
        Ok(id)
    }
}

#[async_trait]
impl MessageProvider for TelegramBotProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        debug!(chat_id = %message.destination, channel_type = %message.channel_type, "Sending Telegram message");

        let mut body = json!({
            "chat_id": message.destination,
            "text": message.content,
        });
        if message.channel_type == "command" {
            body["reply_markup"] = command_keyboard();
        }

        self.post_message(&body).await
    }
}
