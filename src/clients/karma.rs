use anyhow::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    clients::{LedgerClient, build_http_client},
    config::Config,
    error::LedgerError,
    models::{
        payload::escape_html,
        reward::{RewardEvent, RewardKind},
    },
};

/// Wire shape expected by `POST /api/karma/events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KarmaEventRecord {
    pub user_id: String,
    pub karma_type: &'static str,
    pub karma_gain: i32,
    pub karma_loss: i32,
    pub activity: String,
    pub metadata: KarmaEventMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KarmaEventMetadata {
    pub channel: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub message_type: String,
    pub timestamp: String,
    pub success: bool,
    pub trace_id: String,
}

impl From<&RewardEvent> for KarmaEventRecord {
    fn from(event: &RewardEvent) -> Self {
        let (karma_type, karma_gain, karma_loss) = match event.reward_kind {
            RewardKind::Gain => ("SEVA", event.points, 0),
            RewardKind::Loss => ("KARMA_LOSS", 0, event.points),
        };

        Self {
            user_id: event.user_id.clone(),
            karma_type,
            karma_gain,
            karma_loss,
            activity: event.activity_description.clone(),
            metadata: KarmaEventMetadata {
                channel: event.channel.to_string(),
                channel_type: event.channel_type.clone(),
                message_type: event.classification.to_string(),
                timestamp: event
                    .timestamp_utc
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                success: event.success,
                trace_id: event.trace_id.clone(),
            },
        }
    }
}

pub struct KarmaTrackerClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl KarmaTrackerClient {
    pub const DEFAULT_LEDGER_LIMIT: u32 = 50;

    pub fn new(config: &Config) -> Result<Self, Error> {
        info!(base_url = %config.karma_tracker_base_url, "Karma tracker client initialized");

        Ok(Self {
            http_client: build_http_client(config.provider_timeout_seconds)?,
            base_url: config.karma_tracker_base_url.trim_end_matches('/').to_string(),
            api_key: config.karma_tracker_api_key.clone(),
        })
    }

    fn user_url(&self, user_id: &str, tail: &[&str]) -> Result<Url, LedgerError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| LedgerError::Unreachable(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LedgerError::Unreachable(format!("invalid ledger base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "users", user_id])
            .extend(tail);
        Ok(url)
    }

    async fn decode(response: Response) -> Result<Value, LedgerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl LedgerClient for KarmaTrackerClient {
    async fn post_event(&self, event: &RewardEvent) -> Result<Value, LedgerError> {
        let record = KarmaEventRecord::from(event);
        debug!(user_id = %escape_html(&record.user_id), karma_type = record.karma_type, "Posting karma event");

        let response = self
            .http_client
            .post(format!("{}/api/karma/events", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&record)
            .send()
            .await
            .map_err(LedgerError::from_reqwest)?;

        Self::decode(response).await
    }

    async fn get_balance(&self, user_id: &str) -> Result<Value, LedgerError> {
        let response = self
            .http_client
            .get(self.user_url(user_id, &["karma"])?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(LedgerError::from_reqwest)?;

        Self::decode(response).await
    }

    async fn get_ledger(&self, user_id: &str, limit: u32) -> Result<Value, LedgerError> {
        let response = self
            .http_client
            .get(self.user_url(user_id, &["karma", "ledger"])?)
            .query(&[("limit", limit)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(LedgerError::from_reqwest)?;

        Self::decode(response).await
    }
}
