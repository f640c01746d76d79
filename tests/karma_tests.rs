use std::sync::Arc;

use anyhow::Result;
use communication_gateway::{
    clients::{LedgerClient, karma::KarmaTrackerClient},
    error::LedgerError,
    gateway::{RewardEventBuilder, RewardPublisher},
    models::{channel::Channel, dispatch::DispatchResult, reward::Classification},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

use crate::support::test_config;

fn delivery_event() -> communication_gateway::models::reward::RewardEvent {
    RewardEventBuilder::build_event(
        "trace-9",
        "u1",
        Channel::WhatsApp,
        "delivery",
        Classification::DeliveryAlert,
        &DispatchResult::delivered("wamid.1".to_string()),
    )
}

/// Test: Reward events are posted in the ledger's wire format
#[tokio::test]
async fn test_post_event() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/karma/events"))
        .and(header("authorization", "Bearer karma-key"))
        .and(body_partial_json(json!({
            "userId": "u1",
            "karmaType": "SEVA",
            "karmaGain": 3,
            "karmaLoss": 0,
            "activity": "Communication via whatsapp: Delivery Alert",
            "metadata": { "channel": "whatsapp", "type": "delivery", "messageType": "Delivery Alert" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = KarmaTrackerClient::new(&test_config(&server.uri()))?;
    let ack = client.post_event(&delivery_event()).await?;

    assert_eq!(ack["id"], "evt_1");

    Ok(())
}

/// Test: Ledger error statuses are reported as rejections
#[tokio::test]
async fn test_post_event_rejected() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unknown user"))
        .mount(&server)
        .await;

    let client = KarmaTrackerClient::new(&test_config(&server.uri()))?;
    let err = client.post_event(&delivery_event()).await.unwrap_err();

    assert_eq!(
        err,
        LedgerError::Rejected {
            status: 422,
            body: "unknown user".to_string()
        }
    );

    Ok(())
}

/// Test: Balance and ledger queries hit the per-user endpoints
#[tokio::test]
async fn test_balance_and_ledger_queries() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/u1/karma"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": 17 })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/u1/karma/ledger"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entries": [1, 2] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = KarmaTrackerClient::new(&test_config(&server.uri()))?;

    let balance = client.get_balance("u1").await?;
    assert_eq!(balance["balance"], 17);

    let ledger = client
        .get_ledger("u1", KarmaTrackerClient::DEFAULT_LEDGER_LIMIT)
        .await?;
    assert_eq!(ledger["entries"], json!([1, 2]));

    Ok(())
}

/// Test: An unreachable ledger is reported, not panicked on
#[tokio::test]
async fn test_publisher_swallows_unreachable_ledger() -> Result<()> {
    let config = test_config("http://127.0.0.1:9");
    let publisher = RewardPublisher::new(Arc::new(KarmaTrackerClient::new(&config)?));

    let err = publisher.submit(&delivery_event()).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unreachable(_)), "{:?}", err);

    publisher.publish(delivery_event()).await?;

    Ok(())
}
