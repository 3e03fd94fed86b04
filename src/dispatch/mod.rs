//! Operation dispatcher — routes named calls to the right capability.
//!
//! Calls are split across:
//!   - text.rs   — start/close text recognizer
//!   - entity.rs — start/close entity extractor, model management
//!
//! The dispatcher owns the `RecognizerLifecycle`; handlers only borrow
//! engine handles for invocation.

mod entity;
mod text;

use crate::engine::{EngineProvider, ModelManager, Script};
use crate::error::BridgeError;
use crate::lifecycle::{Capability, RecognizerLifecycle};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const START_TEXT_RECOGNIZER: &str = "vision#startTextRecognizer";
pub const CLOSE_TEXT_RECOGNIZER: &str = "vision#closeTextRecognizer";
pub const START_ENTITY_EXTRACTOR: &str = "nlp#startEntityExtractor";
pub const CLOSE_ENTITY_EXTRACTOR: &str = "nlp#closeEntityExtractor";
pub const MANAGE_ENTITY_MODELS: &str = "nlp#manageEntityExtractionModels";

/// An incoming call: method name plus its argument object.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Look up a named argument. `null` counts as absent.
    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn required(&self, key: &str) -> Result<&Value, BridgeError> {
        self.argument(key)
            .ok_or_else(|| BridgeError::InvalidArgument(format!("missing argument '{}'", key)))
    }

    pub(crate) fn required_str(&self, key: &str) -> Result<&str, BridgeError> {
        self.required(key)?.as_str().ok_or_else(|| {
            BridgeError::InvalidArgument(format!("argument '{}' must be a string", key))
        })
    }
}

/// Outcome of a call as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    /// The method name is not one this dispatcher serves.
    NotImplemented,
}

impl MethodResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResult::Success(_))
    }

    /// Error code, if this is an error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResult::Error { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}

impl From<BridgeError> for MethodResult {
    fn from(err: BridgeError) -> Self {
        MethodResult::Error {
            code: err.code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

fn respond<T: Serialize>(result: Result<T, BridgeError>) -> MethodResult {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(v) => MethodResult::Success(v),
            Err(e) => BridgeError::Encoding(e.to_string()).into(),
        },
        Err(e) => e.into(),
    }
}

pub struct OperationDispatcher {
    lifecycle: RecognizerLifecycle,
    model_manager: Option<Arc<dyn ModelManager>>,
}

impl OperationDispatcher {
    pub fn new(provider: Arc<dyn EngineProvider>) -> Self {
        Self {
            lifecycle: RecognizerLifecycle::new(provider),
            model_manager: None,
        }
    }

    pub fn with_model_manager(mut self, manager: Arc<dyn ModelManager>) -> Self {
        self.model_manager = Some(manager);
        self
    }

    pub fn lifecycle(&self) -> &RecognizerLifecycle {
        &self.lifecycle
    }

    /// Build the text recognizer ahead of the first frame.
    pub fn warm_up(&self, script: Script) -> Result<(), BridgeError> {
        let start = std::time::Instant::now();
        self.lifecycle.acquire_text(script)?;
        log::info!(
            "[TEXT] Warm-up ({}) complete in {}ms",
            script,
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Release every held engine.
    pub fn shutdown(&self) {
        log::info!("[DISPATCH] Shutting down, releasing engines");
        self.lifecycle.release_all();
    }

    /// Handle one call to completion.
    pub async fn handle(&self, call: &MethodCall) -> MethodResult {
        log::debug!("[DISPATCH] {}", call.method);
        match call.method.as_str() {
            START_TEXT_RECOGNIZER => respond(text::recognize(&self.lifecycle, call).await),
            CLOSE_TEXT_RECOGNIZER => {
                self.lifecycle.release(Capability::TextRecognition);
                MethodResult::Success(Value::Null)
            }
            START_ENTITY_EXTRACTOR => {
                respond(entity::extract_entities(&self.lifecycle, call).await)
            }
            CLOSE_ENTITY_EXTRACTOR => {
                self.lifecycle.release(Capability::EntityExtraction);
                MethodResult::Success(Value::Null)
            }
            MANAGE_ENTITY_MODELS => match &self.model_manager {
                Some(manager) => respond(entity::manage_model(manager.as_ref(), call).await),
                None => {
                    log::warn!("[MODEL] No model manager configured");
                    MethodResult::NotImplemented
                }
            },
            other => {
                log::debug!("[DISPATCH] Not implemented: {}", other);
                MethodResult::NotImplemented
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn null_arguments_count_as_absent() {
        let call = MethodCall::new("x", json!({ "a": null, "b": "here" }));
        assert!(call.argument("a").is_none());
        assert!(call.argument("missing").is_none());
        assert_eq!(call.required_str("b").unwrap(), "here");
        assert!(matches!(call.required("a"), Err(BridgeError::InvalidArgument(_))));
    }

    #[test]
    fn bridge_errors_become_coded_results() {
        let result: MethodResult = BridgeError::Extraction("model not downloaded".into()).into();
        assert_eq!(
            result,
            MethodResult::Error {
                code: "EntityExtractorError".to_string(),
                message: "model not downloaded".to_string(),
                details: None,
            }
        );
        assert_eq!(result.error_code(), Some("EntityExtractorError"));
        assert!(!result.is_success());
    }

    #[test]
    fn unencodable_results_report_encoding_error() {
        // JSON object keys must be strings.
        let result = respond::<BTreeMap<Vec<u8>, i32>>(Ok(BTreeMap::from([(vec![1u8], 1)])));
        assert_eq!(result.error_code(), Some("EncodingError"));

        assert_eq!(respond::<i32>(Ok(3)), MethodResult::Success(json!(3)));
    }
}
