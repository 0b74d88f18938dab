//! Request handlers

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::AppState;
use crate::core::converter::convert_last_language;
use crate::correction::correct_or_fallback;
use crate::error::{Result, ServiceError};

/// Convert request body
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Convert response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub converted_text: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_api_calls: usize,
    pub ai_analysis_available: bool,
    /// Seconds since the Unix epoch
    pub time: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Rate-limit identity: first X-Forwarded-For entry, else the peer IP
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Non-empty `text` from a JSON body
fn parse_text(body: &[u8]) -> Result<String> {
    let request: ConvertRequest = serde_json::from_slice(body).map_err(|e| {
        log::debug!("unreadable convert body: {}", e);
        ServiceError::NoText
    })?;

    match request.text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ServiceError::NoText),
    }
}

pub async fn convert_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Result<Json<ConvertResponse>> {
    let client = client_id(&headers, peer.map(|ConnectInfo(addr)| addr));

    // held until the response is built, including the LLM round trip
    let _permit = state.gate.acquire(&client)?;

    let text = parse_text(&body)?;
    let converted = convert_last_language(&text);
    log::debug!("{}: {:?} -> {:?}", client, text, converted);

    let converted_text = correct_or_fallback(state.corrector(), &text, converted).await;

    Ok(Json(ConvertResponse { converted_text }))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".to_string(),
        active_api_calls: state.gate.active_calls(),
        ai_analysis_available: state.ai_available,
        time,
    })
}

pub async fn root_status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "healthy",
        message: "Server is running",
    })
}
