use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use communication_gateway::{
    clients::{LedgerClient, MessageProvider},
    config::Config,
    error::{DispatchError, LedgerError},
    gateway::{ChannelDispatcher, GatewayOrchestrator, RewardPublisher},
    models::{channel::Channel, dispatch::OutboundMessage, reward::RewardEvent},
};
use serde_json::{Value, json};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Provider that records every call and answers with a fixed outcome.
pub struct FakeProvider {
    outcome: Result<String, DispatchError>,
    calls: Mutex<Vec<OutboundMessage>>,
}

impl FakeProvider {
    pub fn accepting(message_id: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(message_id.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: DispatchError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<OutboundMessage> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessageProvider for FakeProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(message.clone());
        }
        self.outcome.clone()
    }
}

/// Ledger that forwards posted events to a channel, optionally failing.
pub struct FakeLedger {
    events: UnboundedSender<RewardEvent>,
    fail: bool,
}

impl FakeLedger {
    pub fn new(fail: bool) -> (Arc<Self>, UnboundedReceiver<RewardEvent>) {
        let (events, rx) = unbounded_channel();
        (Arc::new(Self { events, fail }), rx)
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn post_event(&self, event: &RewardEvent) -> Result<Value, LedgerError> {
        let _ = self.events.send(event.clone());
        if self.fail {
            return Err(LedgerError::Unreachable("connection refused".to_string()));
        }
        Ok(json!({ "status": "recorded" }))
    }

    async fn get_balance(&self, user_id: &str) -> Result<Value, LedgerError> {
        if self.fail {
            return Err(LedgerError::Unreachable("connection refused".to_string()));
        }
        Ok(json!({ "userId": user_id, "balance": 12 }))
    }

    async fn get_ledger(&self, user_id: &str, limit: u32) -> Result<Value, LedgerError> {
        if self.fail {
            return Err(LedgerError::Unreachable("connection refused".to_string()));
        }
        Ok(json!({ "userId": user_id, "limit": limit, "entries": [] }))
    }
}

pub struct Harness {
    pub gateway: GatewayOrchestrator,
    pub email: Arc<FakeProvider>,
    pub whatsapp: Arc<FakeProvider>,
    pub telegram: Arc<FakeProvider>,
    pub sms: Arc<FakeProvider>,
    pub events: UnboundedReceiver<RewardEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_providers(
            FakeProvider::accepting("email-1"),
            FakeProvider::accepting("wamid.1"),
            FakeProvider::accepting("42"),
            FakeProvider::accepting("SM1"),
            false,
        )
    }

    pub fn with_providers(
        email: Arc<FakeProvider>,
        whatsapp: Arc<FakeProvider>,
        telegram: Arc<FakeProvider>,
        sms: Arc<FakeProvider>,
        ledger_fails: bool,
    ) -> Self {
        let dispatcher = ChannelDispatcher::new()
            .with_provider(Channel::Email, email.clone())
            .with_provider(Channel::WhatsApp, whatsapp.clone())
            .with_provider(Channel::Telegram, telegram.clone())
            .with_provider(Channel::Sms, sms.clone());

        let (ledger, events) = FakeLedger::new(ledger_fails);
        let gateway = GatewayOrchestrator::new(dispatcher, RewardPublisher::new(ledger));

        Self {
            gateway,
            email,
            whatsapp,
            telegram,
            sms,
            events,
        }
    }

    pub fn total_provider_calls(&self) -> usize {
        self.email.calls().len()
            + self.whatsapp.calls().len()
            + self.telegram.calls().len()
            + self.sms.calls().len()
    }

    pub async fn next_event(&mut self) -> Result<RewardEvent> {
        tokio::time::timeout(Duration::from_secs(2), self.events.recv())
            .await
            .map_err(|_| anyhow!("Timed out waiting for reward event"))?
            .ok_or_else(|| anyhow!("Reward event channel closed"))
    }

    pub async fn assert_no_event(&mut self) {
        let received = tokio::time::timeout(Duration::from_millis(100), self.events.recv()).await;
        assert!(received.is_err(), "No reward event should be published");
    }
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        server_port: 0,
        provider_timeout_seconds: 2,
        smtp_host: "smtp.example.com".to_string(),
        smtp_port: 587,
        smtp_username: "mailer".to_string(),
        smtp_password: "secret".to_string(),
        email_from: "noreply@example.com".to_string(),
        whatsapp_api_base_url: base_url.to_string(),
        whatsapp_phone_number_id: "1055".to_string(),
        whatsapp_access_token: "wa-token".to_string(),
        telegram_api_base_url: base_url.to_string(),
        telegram_bot_token: "123:abc".to_string(),
        twilio_api_base_url: base_url.to_string(),
        twilio_account_sid: "AC123".to_string(),
        twilio_auth_token: "tw-token".to_string(),
        twilio_phone_number: "+15550001111".to_string(),
        twilio_whatsapp_number: "+15550002222".to_string(),
        twilio_status_callback_url: Some(format!("{}/twilio/status", base_url)),
        fast2sms_api_base_url: base_url.to_string(),
        fast2sms_api_key: "f2s-key".to_string(),
        fast2sms_sender_id: "FSTSMS".to_string(),
        karma_tracker_base_url: base_url.to_string(),
        karma_tracker_api_key: "karma-key".to_string(),
    }
}
