use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::info;

use crate::{
    clients::{
        email::SmtpEmailProvider,
        sms::{Fast2SmsProvider, TwilioSmsProvider},
        telegram::TelegramBotProvider,
        whatsapp::{TwilioWhatsAppProvider, WhatsAppCloudProvider},
    },
    config::Config,
    error::{DispatchError, LedgerError},
    models::{channel::Channel, dispatch::OutboundMessage, reward::RewardEvent},
};

pub mod email;
pub mod karma;
pub mod sms;
pub mod telegram;
mod twilio;
pub mod whatsapp;

/// Transmits a message over one channel and returns the provider's id for it.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError>;
}

/// External reputation ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn post_event(&self, event: &RewardEvent) -> Result<Value, LedgerError>;

    async fn get_balance(&self, user_id: &str) -> Result<Value, LedgerError>;

    async fn get_ledger(&self, user_id: &str, limit: u32) -> Result<Value, LedgerError>;
}

/// One provider per channel that has a complete configuration.
pub fn configured_providers(
    config: &Config,
) -> Result<Vec<(Channel, Arc<dyn MessageProvider>)>, Error> {
    let mut providers: Vec<(Channel, Arc<dyn MessageProvider>)> = Vec::new();
    providers.push((Channel::Email, Arc::new(SmtpEmailProvider::new(config)?)));
    providers.push((Channel::Telegram, Arc::new(TelegramBotProvider::new(config)?)));

    if let Some(provider) = whatsapp_provider(config)? {
        providers.push((Channel::WhatsApp, provider));
    }
    if let Some(provider) = sms_provider(config)? {
        providers.push((Channel::Sms, provider));
    }

    info!(
        channels = ?providers.iter().map(|(channel, _)| channel.as_str()).collect::<Vec<_>>(),
        "Message providers configured"
    );
    Ok(providers)
}

/// Cloud API first, Twilio WhatsApp otherwise.
pub fn whatsapp_provider(config: &Config) -> Result<Option<Arc<dyn MessageProvider>>, Error> {
    if config.has_whatsapp_cloud() {
        return Ok(Some(Arc::new(WhatsAppCloudProvider::new(config)?)));
    }
    if config.has_twilio_whatsapp() {
        return Ok(Some(Arc::new(TwilioWhatsAppProvider::new(config)?)));
    }
    Ok(None)
}

/// Twilio first, Fast2SMS otherwise.
pub fn sms_provider(config: &Config) -> Result<Option<Arc<dyn MessageProvider>>, Error> {
    if config.has_twilio_sms() {
        return Ok(Some(Arc::new(TwilioSmsProvider::new(config)?)));
    }
    if config.has_fast2sms() {
        return Ok(Some(Arc::new(Fast2SmsProvider::new(config)?)));
    }
    Ok(None)
}

pub(crate) fn build_http_client(timeout_seconds: u64) -> Result<Client, Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}

/// Turns a non-2xx provider response into a rejection carrying its body.
pub(crate) async fn rejection(response: Response) -> DispatchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    DispatchError::ProviderRejected(format!("{}: {}", status, body))
}
