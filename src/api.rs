//! HTTP API for the campaign dashboard.
//!
//! JSON endpoints live under `/api`; every other path is served from the
//! configured static directory.

use crate::bulk::{BulkRejection, BulkSender};
use crate::single::{send_single, SingleSendRejection};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use herald_core::config::ApiConfig;
use herald_core::template::TemplateCatalog;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{error, info};

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    bulk: BulkSender,
    templates: Arc<TemplateCatalog>,
    api_key: Option<String>,
}

impl ApiState {
    pub fn new(bulk: BulkSender, templates: Arc<TemplateCatalog>, api_key: &str) -> Self {
        Self {
            bulk,
            templates,
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
        }
    }
}

/// `POST /api/send` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    message: String,
    contact_name: Option<String>,
}

/// `POST /api/send-bulk` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkRequest {
    #[serde(default)]
    contact_ids: Vec<u32>,
    #[serde(default)]
    message: String,
    template_id: Option<u32>,
}

fn reject(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({"success": false, "error": error.into()})),
    )
}

fn bulk_status(rejection: BulkRejection) -> StatusCode {
    match rejection {
        BulkRejection::TransportNotReady => StatusCode::SERVICE_UNAVAILABLE,
        BulkRejection::NoContacts | BulkRejection::EmptyTemplate => StatusCode::BAD_REQUEST,
        BulkRejection::AlreadyRunning | BulkRejection::NotRunning => StatusCode::CONFLICT,
    }
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("invalid request: {e}")))
}

/// Constant-time string comparison for API token validation.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check bearer token auth. Returns `Err` with the response to send if rejected.
fn check_auth(headers: &HeaderMap, api_key: &Option<String>) -> Result<(), ApiError> {
    let Some(key) = api_key else {
        return Ok(());
    };

    let value = headers
        .get("authorization")
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "missing Authorization header"))?
        .to_str()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid Authorization header"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token, key) => Ok(()),
        _ => Err(reject(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

/// `GET /api/status`
async fn status(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let transport = state.bulk.transport();
    Ok(Json(json!({
        "ready": transport.is_ready().await,
        "needsAuthentication": transport.needs_authentication().await,
    })))
}

/// `GET /api/contacts`
async fn contacts(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    Ok(Json(json!(state.bulk.contacts().all())))
}

/// `GET /api/templates`
async fn templates(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    Ok(Json(json!(state.templates.all())))
}

/// `POST /api/send`: immediate single send, outside the bulk job.
async fn send(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    check_auth(&headers, &state.api_key)?;
    let request = parse_body(body)?;

    let outcome = send_single(
        state.bulk.transport().as_ref(),
        &request.phone,
        &request.message,
        request.contact_name.as_deref(),
        state.bulk.send_timeout(),
    )
    .await
    .map_err(|e| {
        let status = match e {
            SingleSendRejection::TransportNotReady => StatusCode::SERVICE_UNAVAILABLE,
            SingleSendRejection::MissingInput => StatusCode::BAD_REQUEST,
        };
        reject(status, e.to_string())
    })?;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(json!(outcome))))
}

/// `POST /api/send-bulk`: start a background bulk run.
async fn send_bulk(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<BulkRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let request = parse_body(body)?;

    let template = match request.template_id {
        Some(id) if request.message.trim().is_empty() => state
            .templates
            .get(id)
            .map(|t| t.body.clone())
            .ok_or_else(|| reject(StatusCode::BAD_REQUEST, format!("Template {id} not found")))?,
        _ => request.message,
    };

    let accepted = state
        .bulk
        .submit(request.contact_ids, template)
        .await
        .map_err(|e| reject(bulk_status(e), e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Bulk send started",
        "total": accepted.total,
        "jobId": accepted.job_id,
    })))
}

/// `GET /api/send-progress`
async fn send_progress(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    Ok(Json(json!(state.bulk.progress())))
}

/// `POST /api/send-cancel`
async fn send_cancel(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    state
        .bulk
        .cancel()
        .map_err(|e| reject(bulk_status(e), e.to_string()))?;
    Ok(Json(json!({
        "success": true,
        "message": "Cancellation requested",
    })))
}

/// Build the axum router with shared state.
fn build_router(state: ApiState, static_dir: &str) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/contacts", get(contacts))
        .route("/api/templates", get(templates))
        .route("/api/send", post(send))
        .route("/api/send-bulk", post(send_bulk))
        .route("/api/send-progress", get(send_progress))
        .route("/api/send-cancel", post(send_cancel))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
}

/// Bind and serve until the process exits.
pub async fn serve(config: &ApiConfig, port: u16, state: ApiState) -> anyhow::Result<()> {
    let app = build_router(state, &config.static_dir);
    let addr = format!("{}:{port}", config.host);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("API server failed to bind to {addr}: {e}"))?;

    info!("API server listening on http://{addr}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
