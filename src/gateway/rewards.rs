use chrono::Utc;

use crate::models::{
    channel::Channel,
    dispatch::DispatchResult,
    payload::{Entry, SanitizedPayload},
    reward::{Classification, RewardEvent, RewardKind},
};

pub const FAILURE_PENALTY: i32 = -1;
pub const DEFAULT_GAIN: i32 = 1;

/// Pure mapping from a communication outcome to a ledger record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardEventBuilder;

impl RewardEventBuilder {
    /// Per-channel classification. Email keys off the subject text rather
    /// than the sub-classification.
    pub fn classify(channel: Channel, channel_type: &str, subject: Option<&str>) -> Classification {
        match channel {
            Channel::Email if subject.is_some_and(|s| s.contains("Order")) => {
                Classification::OrderUpdate
            }
            Channel::Email => Classification::Report,
            Channel::WhatsApp if channel_type == "delivery" => Classification::DeliveryAlert,
            Channel::WhatsApp => Classification::CrmAlert,
            Channel::Telegram if channel_type == "notification" => {
                Classification::QuickNotification
            }
            Channel::Telegram => Classification::CommandResponse,
            Channel::Sms if channel_type == "fallback" => Classification::FallbackUpdate,
            Channel::Sms => Classification::UrgentUpdate,
        }
    }

    /// Unified-route classification: the caller's hint verbatim.
    pub fn classify_hint(hint: Option<&str>) -> Classification {
        hint.map(Classification::from_label)
            .unwrap_or(Classification::GeneralMessage)
    }

    pub fn classify_payload(payload: &SanitizedPayload) -> Classification {
        match payload.entry {
            Entry::Direct => Self::classify(
                payload.channel(),
                payload.reward_channel_type(),
                payload.content.subject(),
            ),
            Entry::Unified => Self::classify_hint(payload.message_type_hint.as_deref()),
        }
    }

    /// Points for a successful send. Unknown labels earn the default gain.
    pub fn points_for(classification: &Classification) -> i32 {
        match classification {
            Classification::OrderUpdate => 2,
            Classification::DeliveryAlert => 3,
            Classification::CrmAlert => 1,
            Classification::QuickNotification => 1,
            Classification::CommandResponse => 2,
            Classification::FallbackUpdate => 1,
            Classification::UrgentUpdate => 4,
            Classification::Report => 2,
            Classification::GeneralMessage | Classification::Custom(_) => DEFAULT_GAIN,
        }
    }

    pub fn activity_description(channel: Channel, classification: &Classification) -> String {
        format!("Communication via {}: {}", channel, classification)
    }

    pub fn build_event(
        trace_id: &str,
        user_id: &str,
        channel: Channel,
        channel_type: &str,
        classification: Classification,
        dispatch_result: &DispatchResult,
    ) -> RewardEvent {
        let (reward_kind, points) = if dispatch_result.success {
            (RewardKind::Gain, Self::points_for(&classification))
        } else {
            (RewardKind::Loss, FAILURE_PENALTY)
        };

        RewardEvent {
            trace_id: trace_id.to_string(),
            user_id: user_id.to_string(),
            channel,
            channel_type: channel_type.to_string(),
            activity_description: Self::activity_description(channel, &classification),
            classification,
            reward_kind,
            points,
            timestamp_utc: Utc::now(),
            success: dispatch_result.success,
        }
    }

    pub fn build_for_payload(
        trace_id: &str,
        payload: &SanitizedPayload,
        dispatch_result: &DispatchResult,
    ) -> RewardEvent {
        Self::build_event(
            trace_id,
            &payload.user_id,
            payload.channel(),
            payload.reward_channel_type(),
            Self::classify_payload(payload),
            dispatch_result,
        )
    }
}
