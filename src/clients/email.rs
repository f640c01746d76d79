use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{
        Mailbox,
        header::{ContentType, Header, HeaderName, HeaderValue},
    },
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    clients::MessageProvider, config::Config, error::DispatchError,
    models::dispatch::OutboundMessage,
};

pub const MAILER_NAME: &str = "Logistics Manager Communication Service";

/// `X-Priority`: reports go out as highest priority, everything else normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XPriority(pub u8);

impl XPriority {
    pub fn for_channel_type(channel_type: &str) -> Self {
        if channel_type == "report" { Self(1) } else { Self(3) }
    }
}

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.trim().parse()?))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XMailer(pub String);

impl Header for XMailer {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Mailer")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// SMTP relay sender. The relay does not hand back an id, so the provider
/// stamps its own `Message-ID` and reports that.
pub struct SmtpEmailProvider {
    transport: Arc<SmtpTransport>,
    from: Mailbox,
    message_id_domain: String,
}

impl SmtpEmailProvider {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let from: Mailbox = config
            .email_from
            .parse()
            .map_err(|e| anyhow!("Invalid EMAIL_FROM address: {}", e))?;

        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| anyhow!("Failed to configure SMTP relay: {}", e))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.provider_timeout_seconds)))
            .build();

        info!(host = %config.smtp_host, port = config.smtp_port, "SMTP client initialized");

        Ok(Self {
            transport: Arc::new(transport),
            message_id_domain: from.email.domain().to_string(),
            from,
        })
    }
}

/// Builds the HTML message for one recipient, stamped with `message_id`.
pub fn build_message(
    from: &Mailbox,
    message: &OutboundMessage,
    message_id: &str,
) -> Result<Message, DispatchError> {
    let to: Mailbox = message
        .destination
        .parse()
        .map_err(|e| DispatchError::ProviderRejected(format!("invalid recipient: {}", e)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(message.subject.clone().unwrap_or_default())
        .message_id(Some(message_id.to_string()))
        .header(XPriority::for_channel_type(&message.channel_type))
        .header(XMailer(MAILER_NAME.to_string()))
        .header(ContentType::TEXT_HTML)
        .body(message.content.clone())
        .map_err(|e| DispatchError::ProviderRejected(format!("failed to build email: {}", e)))
}

#[async_trait]
impl MessageProvider for SmtpEmailProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DispatchError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.message_id_domain);
        let email = build_message(&self.from, message, &message_id)?;

        debug!(message_id = %message_id, channel_type = %message.channel_type, "Sending email");

        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| DispatchError::ProviderRejected(format!("email worker failed: {}", e)))?
            .map_err(|e| DispatchError::ProviderRejected(e.to_string()))?;

        info!(message_id = %message_id, "Email sent successfully");
        Ok(message_id)
    }
}
