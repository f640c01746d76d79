use serde::Serialize;

/// What a provider is asked to transmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: String,
    pub subject: Option<String>,
    pub content: String,
    pub channel_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl DispatchResult {
    pub fn delivered(provider_message_id: String) -> Self {
        Self {
            success: true,
            provider_message_id: Some(provider_message_id),
            failure_reason: None,
        }
    }

    pub fn failed(failure_reason: String) -> Self {
        Self {
            success: false,
            provider_message_id: None,
            failure_reason: Some(failure_reason),
        }
    }
}
