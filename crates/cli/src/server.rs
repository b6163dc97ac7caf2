use anyhow::Result;
use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tally_assistant::IntentEngine;
use tally_protocol::{ChatRequest, ChatResponse, HealthReport};

use crate::http_api;
use crate::server_security::ServerGuard;

pub(crate) struct HttpState {
    engine: Arc<IntentEngine>,
    guard: ServerGuard,
}

/// Chat and health routes over one shared engine.
pub(crate) fn router(engine: Arc<IntentEngine>, guard: ServerGuard) -> Router {
    let state = Arc::new(HttpState { engine, guard });
    Router::new()
        .route(
            "/chatbot/message",
            post({
                let state = state.clone();
                move |headers, body| chat_handler(headers, body, state.clone())
            }),
        )
        .route(
            "/health",
            get({
                let state = state.clone();
                move |headers| health_handler(headers, state.clone())
            }),
        )
}

/// Bind with the guard's checks already applied and serve until the listener fails.
pub(crate) async fn serve(
    bind: &str,
    engine: Arc<IntentEngine>,
    guard: ServerGuard,
    mut announce: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let auth_enabled = guard.auth.is_some();
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    announce(&format!("Serving chat endpoint: {base_url}/chatbot/message"))?;
    announce(&format!("Health endpoint: {base_url}/health"))?;
    if auth_enabled {
        announce("Auth enabled: add header 'Authorization: Bearer $TALLY_AUTH_TOKEN'")?;
    }
    announce(&format!(
        "Try: curl -X POST {base_url}/chatbot/message -H 'Content-Type: application/json' -H 'x-user-id: 1' -d '{{\"message\":\"help\"}}'"
    ))?;

    axum::serve(listener, router(engine, guard)).await?;
    Ok(())
}

async fn chat_handler(
    headers: HeaderMap,
    body: Bytes,
    state: Arc<HttpState>,
) -> Result<Response, StatusCode> {
    if !state.guard.authorize(&headers) {
        return http_api::error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Missing or invalid Authorization header",
        );
    }

    let Some(user) = http_api::user_id(&headers) else {
        return http_api::error_response(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "Missing user identity",
        );
    };

    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return http_api::error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                format!("Invalid JSON request: {err}"),
            );
        }
    };

    let resolution = state.engine.resolve(&request.message, &user);
    http_api::json_response(
        StatusCode::OK,
        &ChatResponse {
            response: resolution.text,
            intent: resolution.intent.as_str().to_string(),
        },
    )
}

async fn health_handler(
    headers: HeaderMap,
    state: Arc<HttpState>,
) -> Result<Response, StatusCode> {
    if !state.guard.authorize(&headers) {
        return http_api::error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Missing or invalid Authorization header",
        );
    }

    let report = HealthReport {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        threshold: state.engine.threshold(),
        catalog_entries: state.engine.catalog().len(),
        active_users: state.engine.context().len(),
    };
    http_api::json_response(StatusCode::OK, &report)
}
