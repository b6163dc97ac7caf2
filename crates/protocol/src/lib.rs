use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CHAT_API_VERSION: &str = "1";

/// Header carrying the authenticated user id, set by the session layer in front of the server.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Body of `POST /chatbot/message`. A missing `message` is treated as empty text.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ChatResponse {
    /// Canned reply; may contain one trusted HTML link
    pub response: String,
    /// Intent tag, e.g. `greeting` or `unrecognized`
    pub intent: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub threshold: u8,
    pub catalog_entries: usize,
    pub active_users: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// JSON Schemas for every chat API payload, keyed by type name.
pub fn schemas() -> Result<serde_json::Value> {
    Ok(serde_json::json!({
        "version": CHAT_API_VERSION,
        "ChatRequest": serde_json::to_value(schemars::schema_for!(ChatRequest))?,
        "ChatResponse": serde_json::to_value(schemars::schema_for!(ChatResponse))?,
        "HealthReport": serde_json::to_value(schemars::schema_for!(HealthReport))?,
        "ErrorEnvelope": serde_json::to_value(schemars::schema_for!(ErrorEnvelope))?,
    }))
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
