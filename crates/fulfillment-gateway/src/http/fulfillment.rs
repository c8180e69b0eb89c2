//! Webhook endpoint: POST {gateway.path}.
//!
//! One request builds one `WebhookClient`; the recorded response is returned
//! as the HTTP reply.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fulfillment_client::{MemoryResponse, WebhookClient};
use fulfillment_core::FulfillmentError;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;

pub async fn fulfillment_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = Uuid::now_v7();
    let seq = state.record_request();

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(%request_id, error = %e, "invalid JSON in webhook body");
            return error_body(StatusCode::BAD_REQUEST, "INVALID_JSON", "invalid JSON body");
        }
    };

    let response = MemoryResponse::new();
    let mut client = match WebhookClient::builder()
        .request(payload)
        .response(response.clone())
        .observer(state.observer.clone())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(%request_id, error = %e, "webhook request rejected");
            return client_error(StatusCode::BAD_REQUEST, &e);
        }
    };

    info!(
        %request_id,
        seq,
        dialect = %client.dialect(),
        intent = client.intent().unwrap_or(""),
        "webhook arrived"
    );

    if let Err(e) = client.handle_request(state.dispatch.clone()).await {
        warn!(%request_id, code = e.code(), error = %e, "fulfillment failed");
        // The client sets 400 itself for an unmatched intent.
        let status = match response.status() {
            200 if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            200 => StatusCode::INTERNAL_SERVER_ERROR,
            other => StatusCode::from_u16(other).unwrap_or(StatusCode::BAD_REQUEST),
        };
        return client_error(status, &e);
    }

    let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::OK);
    match response.body() {
        Some(body) => (status, Json(body)).into_response(),
        None => error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "MISSING_RESPONSE",
            "handler finished without a response",
        ),
    }
}

fn client_error(status: StatusCode, e: &FulfillmentError) -> Response {
    error_body(status, e.code(), &e.to_string())
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({"error": message, "code": code}))).into_response()
}
