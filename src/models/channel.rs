use std::{
    fmt::{Display, Formatter, Result},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    WhatsApp,
    Telegram,
    Sms,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Email,
        Channel::WhatsApp,
        Channel::Telegram,
        Channel::Sms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::WhatsApp => "whatsapp",
            Channel::Telegram => "telegram",
            Channel::Sms => "sms",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Channel::as_str).collect()
    }

    /// Sub-classification applied when a request omits `type`.
    pub fn default_channel_type(&self) -> &'static str {
        match self {
            Channel::Email => "transactional",
            Channel::WhatsApp => "delivery",
            Channel::Telegram => "notification",
            Channel::Sms => "fallback",
        }
    }

    /// Prefix used in caller-visible provider failure messages.
    pub fn sending_label(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::WhatsApp => "WhatsApp message",
            Channel::Telegram => "Telegram message",
            Channel::Sms => "SMS",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "whatsapp" => Ok(Channel::WhatsApp),
            "telegram" => Ok(Channel::Telegram),
            "sms" => Ok(Channel::Sms),
            _ => Err(ValidationError::InvalidChannel),
        }
    }
}
