use anyhow::Result;
use communication_gateway::{
    error::DispatchError,
    gateway::ChannelDispatcher,
    models::{channel::Channel, request::SendRequest, validation::validate},
};

use crate::support::FakeProvider;

fn whatsapp_request() -> SendRequest {
    SendRequest {
        to: Some("+1234567890".to_string()),
        message: Some("Your order left the warehouse".to_string()),
        user_id: Some("u1".to_string()),
        ..Default::default()
    }
}

/// Test: Provider success is normalized with its message id
#[tokio::test]
async fn test_dispatch_success() -> Result<()> {
    let provider = FakeProvider::accepting("wamid.abc");
    let dispatcher = ChannelDispatcher::new().with_provider(Channel::WhatsApp, provider.clone());

    let payload = validate(Channel::WhatsApp, &whatsapp_request())?;
    let result = dispatcher.dispatch(&payload).await?;

    assert!(result.success);
    assert_eq!(result.provider_message_id.as_deref(), Some("wamid.abc"));
    assert_eq!(result.failure_reason, None);

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].destination, "+1234567890");
    assert_eq!(calls[0].content, "Your order left the warehouse");
    assert_eq!(calls[0].channel_type, "delivery");
    assert_eq!(calls[0].subject, None);

    Ok(())
}

/// Test: Provider failure becomes an unsuccessful result, not an error
#[tokio::test]
async fn test_dispatch_failure_normalized() -> Result<()> {
    let provider = FakeProvider::failing(DispatchError::ProviderRejected("invalid token".to_string()));
    let dispatcher = ChannelDispatcher::new().with_provider(Channel::WhatsApp, provider.clone());

    let payload = validate(Channel::WhatsApp, &whatsapp_request())?;
    let result = dispatcher.dispatch(&payload).await?;

    assert!(!result.success);
    assert_eq!(result.provider_message_id, None);
    assert_eq!(
        result.failure_reason.as_deref(),
        Some("WhatsApp message sending failed: invalid token")
    );
    assert_eq!(provider.calls().len(), 1, "No retry after failure");

    Ok(())
}

/// Test: Timeouts surface as failures with the timeout text
#[tokio::test]
async fn test_dispatch_timeout_normalized() -> Result<()> {
    let provider = FakeProvider::failing(DispatchError::ProviderTimeout("operation timed out".to_string()));
    let dispatcher = ChannelDispatcher::new().with_provider(Channel::Sms, provider);

    let payload = validate(Channel::Sms, &whatsapp_request())?;
    let result = dispatcher.dispatch(&payload).await?;

    assert!(!result.success);
    assert_eq!(
        result.failure_reason.as_deref(),
        Some("SMS sending failed: provider timed out: operation timed out")
    );

    Ok(())
}

/// Test: Unregistered channels are rejected without any call
#[tokio::test]
async fn test_dispatch_without_provider() -> Result<()> {
    let provider = FakeProvider::accepting("x");
    let dispatcher = ChannelDispatcher::new().with_provider(Channel::Email, provider.clone());

    let payload = validate(Channel::WhatsApp, &whatsapp_request())?;
    let err = dispatcher.dispatch(&payload).await.unwrap_err();

    assert_eq!(err, DispatchError::NoProvider(Channel::WhatsApp));
    assert!(!dispatcher.has_provider(Channel::WhatsApp));
    assert!(provider.calls().is_empty());

    Ok(())
}

/// Test: Email subject travels to the provider alongside the body
#[tokio::test]
async fn test_dispatch_email_fields() -> Result<()> {
    let provider = FakeProvider::accepting("<1@example.com>");
    let dispatcher = ChannelDispatcher::new().with_provider(Channel::Email, provider.clone());

    let request = SendRequest {
        to: Some("a@b.com".to_string()),
        subject: Some("Monthly report".to_string()),
        body: Some("<h1>Totals</h1>".to_string()),
        user_id: Some("u1".to_string()),
        channel_type: Some("report".to_string()),
        ..Default::default()
    };
    let payload = validate(Channel::Email, &request)?;
    dispatcher.dispatch(&payload).await?;

    let calls = provider.calls();
    assert_eq!(calls[0].subject.as_deref(), Some("Monthly report"));
    assert_eq!(calls[0].content, "<h1>Totals</h1>");
    assert_eq!(calls[0].channel_type, "report");

    Ok(())
}
