use axum::{
    body::Body,
    http::{HeaderMap, Response as HttpResponse, StatusCode},
    response::Response,
};
use serde::Serialize;
use tally_assistant::UserId;
use tally_protocol::{serialize_json, ErrorEnvelope, USER_ID_HEADER};

/// Identity injected by the session layer. Blank or non-UTF-8 values count as missing.
pub(crate) fn user_id(headers: &HeaderMap) -> Option<UserId> {
    let value = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| UserId::from(value))
}

pub(crate) fn error_envelope(code: &str, message: String) -> ErrorEnvelope {
    let envelope = ErrorEnvelope::new(code, message);
    match code {
        "unauthorized" => envelope.with_hint(
            "If the server is started with TALLY_AUTH_TOKEN, include Authorization: Bearer <token>.",
        ),
        "unauthenticated" => envelope.with_hint(format!(
            "The session layer must forward the signed-in user as the {USER_ID_HEADER} header."
        )),
        "invalid_request" => {
            envelope.with_hint("Send a JSON object such as {\"message\": \"show my expenses\"}.")
        }
        _ => envelope,
    }
}

pub(crate) fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> Result<Response, StatusCode> {
    log::warn!("rejecting chat request: {code} ({status})");
    json_response(status, &error_envelope(code, message.into()))
}

pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response, StatusCode> {
    let bytes = serialize_json(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();

    let mut builder = HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json");

    if status == StatusCode::UNAUTHORIZED {
        builder = builder.header("www-authenticate", "Bearer");
    }

    builder
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
