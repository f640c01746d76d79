use thiserror::Error;

use crate::models::channel::Channel;

/// Request payload rejected before any provider is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidFormat(&'static str),

    #[error("{field} must be at least {min} characters long")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must not exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid channel. Must be one of: {}", Channel::names().join(", "))]
    InvalidChannel,
}

/// Failure reported by a message provider, or by the dispatcher when no
/// provider is registered for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{0}")]
    ProviderRejected(String),

    #[error("provider timed out: {0}")]
    ProviderTimeout(String),

    #[error("malformed provider response: {0}")]
    ProviderMalformedResponse(String),

    #[error("No provider registered for channel {0}")]
    NoProvider(Channel),
}

impl DispatchError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            DispatchError::ProviderTimeout(error.to_string())
        } else if error.is_decode() {
            DispatchError::ProviderMalformedResponse(error.to_string())
        } else {
            DispatchError::ProviderRejected(error.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    #[error("ledger rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),
}

impl LedgerError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_decode() {
            LedgerError::MalformedResponse(error.to_string())
        } else {
            LedgerError::Unreachable(error.to_string())
        }
    }
}

/// Caller-visible failure of a send request. Both variants are reported
/// with the same status, distinguished only by message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    DispatchFailed(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
