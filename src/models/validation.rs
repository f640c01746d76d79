use std::sync::LazyLock;

use lettre::Address;
use regex::Regex;

use crate::{
    error::ValidationError,
    models::{
        channel::Channel,
        payload::{Entry, MessagePayload, SanitizedPayload, escape_html},
        request::SendRequest,
    },
};

pub const EMAIL_SUBJECT_MAX: usize = 200;
pub const EMAIL_BODY_MAX: usize = 10_000;
pub const WHATSAPP_MESSAGE_MAX: usize = 4096;
pub const TELEGRAM_MESSAGE_MAX: usize = 4096;
pub const SMS_MESSAGE_MAX: usize = 160;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("valid phone regex"));

static CHAT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid chat id regex"));

/// `local@domain.tld` that the mail transport can also address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email) && email.parse::<Address>().is_ok()
}

/// E.164-like: optional `+`, 2 to 15 digits, no leading zero. Whitespace is
/// ignored.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&compact)
}

pub fn is_valid_chat_id(chat_id: &str) -> bool {
    CHAT_ID_RE.is_match(chat_id)
}

/// Validates a request that arrived on a channel-specific route. Any
/// `messageType` hint is ignored on these routes.
pub fn validate(channel: Channel, request: &SendRequest) -> Result<SanitizedPayload, ValidationError> {
    let content = match channel {
        Channel::Email => validate_email_payload(request)?,
        Channel::WhatsApp => validate_phone_payload(request, WHATSAPP_MESSAGE_MAX, |to, message| {
            MessagePayload::WhatsApp { to, message }
        })?,
        Channel::Telegram => validate_telegram_payload(request)?,
        Channel::Sms => validate_phone_payload(request, SMS_MESSAGE_MAX, |to, message| {
            MessagePayload::Sms { to, message }
        })?,
    };

    Ok(sanitize(request, content))
}

/// Validates a request from the unified route: the channel name is checked
/// before any channel-specific rule runs.
pub fn validate_unified(request: &SendRequest) -> Result<SanitizedPayload, ValidationError> {
    let channel: Channel = required(&request.channel, "channel")?.parse()?;

    let mut validated = validate(channel, request)?;
    validated.entry = Entry::Unified;
    validated.message_type_hint = request
        .message_type
        .as_deref()
        .filter(|hint| !hint.trim().is_empty())
        .map(escape_html);

    Ok(validated)
}

fn validate_email_payload(request: &SendRequest) -> Result<MessagePayload, ValidationError> {
    let to = required(&request.to, "to")?;
    let subject = required(&request.subject, "subject")?;
    let body = required(&request.body, "body")?;
    required(&request.user_id, "userId")?;

    if !is_valid_email(to) {
        return Err(ValidationError::InvalidFormat("Invalid recipient email format"));
    }

    check_length(subject, "Email subject", 1, EMAIL_SUBJECT_MAX)?;
    check_length(body, "Email body", 1, EMAIL_BODY_MAX)?;

    Ok(MessagePayload::Email {
        to: to.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
    })
}

fn validate_phone_payload(
    request: &SendRequest,
    max_len: usize,
    build: impl FnOnce(String, String) -> MessagePayload,
) -> Result<MessagePayload, ValidationError> {
    let to = required(&request.to, "to")?;
    let message = required(&request.message, "message")?;
    required(&request.user_id, "userId")?;

    if !is_valid_phone_number(to) {
        return Err(ValidationError::InvalidFormat(
            "Invalid phone number format. Use international format (e.g., +1234567890)",
        ));
    }

    check_length(message, "Message", 1, max_len)?;

    Ok(build(to.to_string(), message.to_string()))
}

fn validate_telegram_payload(request: &SendRequest) -> Result<MessagePayload, ValidationError> {
    let chat_id = required(&request.chat_id, "chatId")?;
    let message = required(&request.message, "message")?;
    required(&request.user_id, "userId")?;

    if !is_valid_chat_id(chat_id) {
        return Err(ValidationError::InvalidFormat("Chat ID must be numeric"));
    }

    check_length(message, "Message", 1, TELEGRAM_MESSAGE_MAX)?;

    Ok(MessagePayload::Telegram {
        chat_id: chat_id.to_string(),
        message: message.to_string(),
    })
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn check_length(value: &str, field: &'static str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn sanitize(request: &SendRequest, content: MessagePayload) -> SanitizedPayload {
    SanitizedPayload {
        entry: Entry::Direct,
        user_id: request.user_id.clone().unwrap_or_default(),
        channel_type: request
            .channel_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(escape_html),
        message_type_hint: None,
        content,
    }
}
