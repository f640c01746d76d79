use crate::models::channel::Channel;

/// Which route a request came in through. Only the unified route honours a
/// caller-supplied `messageType` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Direct,
    Unified,
}

/// Channel-specific content, each variant carrying exactly the fields its
/// provider needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Email {
        to: String,
        subject: String,
        body: String,
    },
    WhatsApp { to: String, message: String },
    Telegram { chat_id: String, message: String },
    Sms { to: String, message: String },
}

impl MessagePayload {
    pub fn channel(&self) -> Channel {
        match self {
            MessagePayload::Email { .. } => Channel::Email,
            MessagePayload::WhatsApp { .. } => Channel::WhatsApp,
            MessagePayload::Telegram { .. } => Channel::Telegram,
            MessagePayload::Sms { .. } => Channel::Sms,
        }
    }

    pub fn destination(&self) -> &str {
        match self {
            MessagePayload::Email { to, .. }
            | MessagePayload::WhatsApp { to, .. }
            | MessagePayload::Sms { to, .. } => to,
            MessagePayload::Telegram { chat_id, .. } => chat_id,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            MessagePayload::Email { subject, .. } => Some(subject),
            _ => None,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            MessagePayload::Email { body, .. } => body,
            MessagePayload::WhatsApp { message, .. }
            | MessagePayload::Telegram { message, .. }
            | MessagePayload::Sms { message, .. } => message,
        }
    }

    /// Copy with every string field HTML-escaped.
    pub fn escaped(&self) -> Self {
        match self {
            MessagePayload::Email { to, subject, body } => MessagePayload::Email {
                to: escape_html(to),
                subject: escape_html(subject),
                body: escape_html(body),
            },
            MessagePayload::WhatsApp { to, message } => MessagePayload::WhatsApp {
                to: escape_html(to),
                message: escape_html(message),
            },
            MessagePayload::Telegram { chat_id, message } => MessagePayload::Telegram {
                chat_id: escape_html(chat_id),
                message: escape_html(message),
            },
            MessagePayload::Sms { to, message } => MessagePayload::Sms {
                to: escape_html(to),
                message: escape_html(message),
            },
        }
    }
}

/// A fully validated request. `content` is what the provider transmits and
/// `user_id` is the raw ledger identity. `channel_type` and
/// `message_type_hint` are already escaped since they are only descriptive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPayload {
    pub entry: Entry,
    pub user_id: String,
    pub channel_type: Option<String>,
    pub message_type_hint: Option<String>,
    pub content: MessagePayload,
}

impl SanitizedPayload {
    pub fn channel(&self) -> Channel {
        self.content.channel()
    }

    /// Sub-classification handed to the provider.
    pub fn provider_channel_type(&self) -> &str {
        self.channel_type
            .as_deref()
            .unwrap_or_else(|| self.channel().default_channel_type())
    }

    /// Sub-classification recorded on the reward event.
    pub fn reward_channel_type(&self) -> &str {
        match (&self.channel_type, self.entry) {
            (Some(channel_type), _) => channel_type.as_str(),
            (None, Entry::Unified) => "general",
            (None, Entry::Direct) => self.channel().default_channel_type(),
        }
    }
}

/// Escapes `& < > " ' /` so a value is inert in any HTML or log context.
pub fn escape_html(input: &str) -> String {
    html_escape::encode_safe(input).into_owned()
}
