use anyhow::{Error, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    clients::{build_http_client, rejection},
    config::Config,
    error::DispatchError,
};

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
}

/// Twilio Programmable Messaging `Messages` resource, shared by the SMS and
/// WhatsApp senders.
pub(crate) struct TwilioMessagesApi {
    http_client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioMessagesApi {
    pub(crate) fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            http_client: build_http_client(config.provider_timeout_seconds)?,
            base_url: config.twilio_api_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
        })
    }

    pub(crate) fn account_sid(&self) -> &str {
        &self.account_sid
    }

    /// Creates one message and returns its `sid`.
    pub(crate) async fn create(
        &self,
        to: &str,
        from: &str,
        body: &str,
        status_callback: Option<&str>,
    ) -> Result<String, DispatchError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let mut form = vec![("To", to), ("From", from), ("Body", body)];
        if let Some(callback) = status_callback {
            form.push(("StatusCallback", callback));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(DispatchError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let parsed: TwilioMessage = response
            .json()
            .await
            .map_err(|e| DispatchError::ProviderMalformedResponse(e.to_string()))?;

        parsed.sid.ok_or_else(|| {
            DispatchError::ProviderMalformedResponse("response carried no sid".to_string())
        })
    }
}
