use std::{collections::HashMap, sync::Arc};

use tracing::{info, warn};

use crate::{
    clients::MessageProvider,
    error::DispatchError,
    models::{
        channel::Channel,
        dispatch::{DispatchResult, OutboundMessage},
        payload::SanitizedPayload,
    },
};

/// Routes a validated payload to the provider registered for its channel.
/// Holds no per-request state; providers are shared handles.
#[derive(Clone, Default)]
pub struct ChannelDispatcher {
    providers: HashMap<Channel, Arc<dyn MessageProvider>>,
}

impl ChannelDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, channel: Channel, provider: Arc<dyn MessageProvider>) -> Self {
        self.providers.insert(channel, provider);
        self
    }

    pub fn has_provider(&self, channel: Channel) -> bool {
        self.providers.contains_key(&channel)
    }

    /// Makes exactly one provider call. Provider failures come back as an
    /// unsuccessful `DispatchResult`; only a missing provider is an `Err`.
    pub async fn dispatch(&self, payload: &SanitizedPayload) -> Result<DispatchResult, DispatchError> {
        let channel = payload.channel();
        let provider = self
            .providers
            .get(&channel)
            .ok_or(DispatchError::NoProvider(channel))?;

        let message = OutboundMessage {
            destination: payload.content.destination().to_string(),
            subject: payload.content.subject().map(str::to_string),
            content: payload.content.content().to_string(),
            channel_type: payload.provider_channel_type().to_string(),
        };

        match provider.send(&message).await {
            Ok(provider_message_id) => {
                info!(
                    channel = %channel,
                    message_id = %provider_message_id,
                    "Provider accepted message"
                );
                Ok(DispatchResult::delivered(provider_message_id))
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Provider call failed");
                Ok(DispatchResult::failed(format!(
                    "{} sending failed: {}",
                    channel.sending_label(),
                    e
                )))
            }
        }
    }
}
