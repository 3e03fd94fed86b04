//! Wire framing for the call channel (newline-delimited JSON).
//!
//! - request:  `{"id": 7, "method": "vision#startTextRecognizer", "arguments": {...}}`
//! - success:  `{"id": 7, "result": ...}`
//! - failure:  `{"id": 7, "error": {"code": ..., "message": ..., "details": ...}}`
//! - unknown:  `{"id": 7, "notImplemented": true}`

use crate::dispatch::{MethodCall, MethodResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Incoming call (caller → bridge).
#[derive(Debug, Deserialize)]
pub struct ChannelRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ChannelRequest {
    pub fn into_call(self) -> (u64, MethodCall) {
        (self.id, MethodCall::new(self.method, self.arguments))
    }
}

/// Error object (bridge → caller).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Outgoing response. Exactly one of the three outcome keys is present.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResponse {
    pub id: Option<u64>,
    pub outcome: MethodResult,
}

impl ChannelResponse {
    pub fn new(id: Option<u64>, outcome: MethodResult) -> Self {
        Self { id, outcome }
    }

    /// Response for a line that could not be read as a request.
    pub fn invalid_request(id: Option<u64>, message: impl Into<String>) -> Self {
        Self::new(
            id,
            MethodResult::Error {
                code: "InvalidRequest".to_string(),
                message: message.into(),
                details: None,
            },
        )
    }

    pub fn to_value(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("id".into(), self.id.map(Value::from).unwrap_or(Value::Null));
        match &self.outcome {
            MethodResult::Success(result) => {
                obj.insert("result".into(), result.clone());
            }
            MethodResult::Error {
                code,
                message,
                details,
            } => {
                let error = ChannelError {
                    code: code.clone(),
                    message: message.clone(),
                    details: details.clone(),
                };
                obj.insert("error".into(), serde_json::to_value(error).unwrap_or(Value::Null));
            }
            MethodResult::NotImplemented => {
                obj.insert("notImplemented".into(), Value::Bool(true));
            }
        }
        Value::Object(obj)
    }
}
