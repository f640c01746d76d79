use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::models::channel::Channel;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    OrderUpdate,
    Report,
    DeliveryAlert,
    CrmAlert,
    QuickNotification,
    CommandResponse,
    FallbackUpdate,
    UrgentUpdate,
    GeneralMessage,
    Custom(String),
}

impl Classification {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Order Update" => Classification::OrderUpdate,
            "Report" => Classification::Report,
            "Delivery Alert" => Classification::DeliveryAlert,
            "CRM Alert" => Classification::CrmAlert,
            "Quick Notification" => Classification::QuickNotification,
            "Command Response" => Classification::CommandResponse,
            "Fallback Update" => Classification::FallbackUpdate,
            "Urgent Update" => Classification::UrgentUpdate,
            "General Message" => Classification::GeneralMessage,
            other => Classification::Custom(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Classification::OrderUpdate => "Order Update",
            Classification::Report => "Report",
            Classification::DeliveryAlert => "Delivery Alert",
            Classification::CrmAlert => "CRM Alert",
            Classification::QuickNotification => "Quick Notification",
            Classification::CommandResponse => "Command Response",
            Classification::FallbackUpdate => "Fallback Update",
            Classification::UrgentUpdate => "Urgent Update",
            Classification::GeneralMessage => "General Message",
            Classification::Custom(label) => label,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RewardKind {
    Gain,
    Loss,
}

/// Point award or penalty for a single communication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEvent {
    pub trace_id: String,
    pub user_id: String,
    pub channel: Channel,
    pub channel_type: String,
    pub classification: Classification,
    pub reward_kind: RewardKind,
    pub points: i32,
    pub activity_description: String,
    pub timestamp_utc: DateTime<Utc>,
    pub success: bool,
}
