use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{GatewayError, ValidationError},
    gateway::{ChannelDispatcher, RewardEventBuilder, RewardPublisher},
    models::{
        channel::Channel,
        payload::{SanitizedPayload, escape_html},
        request::SendRequest,
        validation,
    },
};

/// Lifecycle of a single send request. Used for log correlation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Validating,
    Invalid,
    Dispatching,
    DispatchFailed,
    Dispatched,
    PublishingReward,
    Responded,
}

impl Display for RequestStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let stage = match self {
            RequestStage::Received => "received",
            RequestStage::Validating => "validating",
            RequestStage::Invalid => "invalid",
            RequestStage::Dispatching => "dispatching",
            RequestStage::DispatchFailed => "dispatch_failed",
            RequestStage::Dispatched => "dispatched",
            RequestStage::PublishingReward => "publishing_reward",
            RequestStage::Responded => "responded",
        };
        write!(f, "{}", stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: Channel,
    pub message_id: String,
}

/// Validate, dispatch, then hand the outcome to the reward publisher without
/// waiting on it.
#[derive(Clone)]
pub struct GatewayOrchestrator {
    dispatcher: ChannelDispatcher,
    publisher: RewardPublisher,
}

impl GatewayOrchestrator {
    pub fn new(dispatcher: ChannelDispatcher, publisher: RewardPublisher) -> Self {
        Self {
            dispatcher,
            publisher,
        }
    }

    pub fn publisher(&self) -> &RewardPublisher {
        &self.publisher
    }

    pub async fn send(&self, channel: Channel, request: &SendRequest) -> Result<Delivery, GatewayError> {
        let trace_id = Uuid::new_v4().to_string();
        debug!(trace_id = %trace_id, channel = %channel, stage = %RequestStage::Received, "Send request");

        self.run(&trace_id, validation::validate(channel, request)).await
    }

    pub async fn send_unified(&self, request: &SendRequest) -> Result<Delivery, GatewayError> {
        let trace_id = Uuid::new_v4().to_string();
        debug!(trace_id = %trace_id, stage = %RequestStage::Received, "Unified send request");

        self.run(&trace_id, validation::validate_unified(request)).await
    }

    async fn run(
        &self,
        trace_id: &str,
        validated: Result<SanitizedPayload, ValidationError>,
    ) -> Result<Delivery, GatewayError> {
        debug!(trace_id = %trace_id, stage = %RequestStage::Validating);

        let payload = match validated {
            Ok(payload) => payload,
            Err(e) => {
                warn!(trace_id = %trace_id, stage = %RequestStage::Invalid, error = %e, "Validation failed");
                return Err(e.into());
            }
        };

        let channel = payload.channel();
        info!(
            trace_id = %trace_id,
            channel = %channel,
            user_id = %escape_html(&payload.user_id),
            stage = %RequestStage::Dispatching,
            content = ?payload.content.escaped(),
            "Dispatching message"
        );

        let result = self.dispatcher.dispatch(&payload).await?;

        let response = match (&result.provider_message_id, &result.failure_reason) {
            (Some(message_id), _) if result.success => {
                info!(trace_id = %trace_id, stage = %RequestStage::Dispatched, message_id = %message_id);
                Ok(Delivery {
                    channel,
                    message_id: message_id.clone(),
                })
            }
            (_, reason) => {
                let reason = reason
                    .clone()
                    .unwrap_or_else(|| format!("{} sending failed", channel.sending_label()));
                warn!(trace_id = %trace_id, stage = %RequestStage::DispatchFailed, reason = %reason);
                Err(GatewayError::DispatchFailed(reason))
            }
        };

        let event = RewardEventBuilder::build_for_payload(trace_id, &payload, &result);
        debug!(
            trace_id = %trace_id,
            stage = %RequestStage::PublishingReward,
            classification = %event.classification,
            points = event.points
        );
        self.publisher.publish(event);

        debug!(trace_id = %trace_id, stage = %RequestStage::Responded);
        response
    }
}
