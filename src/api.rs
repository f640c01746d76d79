use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    clients::karma::KarmaTrackerClient,
    error::GatewayError,
    gateway::{GatewayOrchestrator, orchestrator::Delivery},
    models::{
        channel::Channel,
        health::{HealthCheckResponse, ServiceSummary},
        payload::escape_html,
        request::SendRequest,
        response::{ApiResponse, SendResponse},
    },
};

pub struct AppState {
    pub gateway: GatewayOrchestrator,
    pub services: ServiceSummary,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/communication/email", post(send_email))
        .route("/api/communication/whatsapp", post(send_whatsapp))
        .route("/api/communication/telegram", post(send_telegram))
        .route("/api/communication/sms", post(send_sms))
        .route("/api/communication/send", post(send_unified))
        .route("/api/karma/{user_id}", get(karma_balance))
        .route("/api/karma/{user_id}/ledger", get(karma_ledger))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(state: Arc<AppState>, port: u16) -> Result<(), Error> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Communication gateway listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn failure(error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SendResponse::error(error)),
    )
        .into_response()
}

async fn send_on(
    state: &AppState,
    channel: Channel,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return failure(rejection.body_text()),
    };

    respond(state.gateway.send(channel, &request).await, false)
}

fn respond(outcome: Result<Delivery, GatewayError>, echo_channel: bool) -> Response {
    match outcome {
        Ok(delivery) => {
            let mut response = SendResponse::success(delivery.message_id);
            if echo_channel {
                response = response.with_channel(delivery.channel);
            }
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => failure(e.to_string()),
    }
}

async fn send_email(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    send_on(&state, Channel::Email, body).await
}

async fn send_whatsapp(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    send_on(&state, Channel::WhatsApp, body).await
}

async fn send_telegram(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    send_on(&state, Channel::Telegram, body).await
}

async fn send_sms(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    send_on(&state, Channel::Sms, body).await
}

async fn send_unified(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return failure(rejection.body_text()),
    };

    respond(state.gateway.send_unified(&request).await, true)
}

#[derive(Debug, Deserialize)]
struct LedgerQuery {
    limit: Option<u32>,
}

async fn karma_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Response {
    let ledger = state.gateway.publisher().ledger();
    match ledger.get_balance(&user_id).await {
        Ok(balance) => (StatusCode::OK, Json(ApiResponse::success(balance))).into_response(),
        Err(e) => {
            warn!(user_id = %escape_html(&user_id), error = %e, "Failed to get user karma");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::<()>::error(format!("Failed to get user karma: {}", e))),
            )
                .into_response()
        }
    }
}

async fn karma_ledger(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<LedgerQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(KarmaTrackerClient::DEFAULT_LEDGER_LIMIT);
    let ledger = state.gateway.publisher().ledger();
    match ledger.get_ledger(&user_id, limit).await {
        Ok(entries) => (StatusCode::OK, Json(ApiResponse::success(entries))).into_response(),
        Err(e) => {
            warn!(user_id = %escape_html(&user_id), error = %e, "Failed to get karma ledger");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::<()>::error(format!("Failed to get karma ledger: {}", e))),
            )
                .into_response()
        }
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(HealthCheckResponse::ok(state.services.clone())))
}
