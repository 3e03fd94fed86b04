//! Engine contracts — the black-box recognizers this crate drives.
//!
//! Nothing in here runs inference. Platform bindings implement these
//! traits; the rest of the crate only sees the native result types and
//! the single-shot completion they resolve to.
//!
//!   - text.rs   — recognizer output tree + script selection
//!   - entity.rs — extractor output (annotations, entity kinds) + params

pub mod entity;
pub mod text;

use crate::input_image::InputImage;
use thiserror::Error;
use tokio::sync::oneshot;

pub use entity::{EntityAnnotation, ExtractionParams};
pub use text::{Script, Text};

/// Failure reported by an engine. The message is passed to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Single-shot completion of an engine call. Resolves exactly once.
pub type Pending<T> = oneshot::Receiver<Result<T, EngineError>>;

/// Build a completion pair. Engines keep the sender and fire it when done.
pub fn pending<T>() -> (oneshot::Sender<Result<T, EngineError>>, Pending<T>) {
    oneshot::channel()
}

/// Await a completion. A sender dropped without firing counts as an engine failure.
pub async fn complete<T>(pending: Pending<T>) -> Result<T, EngineError> {
    pending.await.unwrap_or_else(|_| {
        Err(EngineError::new(
            "engine dropped the request without completing it",
        ))
    })
}

/// A live text recognizer bound to one script.
pub trait TextRecognizer: Send + Sync {
    fn process(&self, image: InputImage) -> Pending<Text>;

    fn close(&self) -> Result<(), EngineError>;
}

/// A live entity extractor bound to one language model.
pub trait EntityExtractor: Send + Sync {
    fn annotate(&self, params: ExtractionParams) -> Pending<Vec<EntityAnnotation>>;

    fn close(&self) -> Result<(), EngineError>;
}

/// Constructs engines. Construction may fail (missing model, bad options).
pub trait EngineProvider: Send + Sync {
    fn text_recognizer(&self, script: Script) -> Result<Box<dyn TextRecognizer>, EngineError>;

    fn entity_extractor(&self, language: &str) -> Result<Box<dyn EntityExtractor>, EngineError>;
}

/// A downloadable entity-extraction model, identified by its model id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteModel {
    pub model_id: String,
}

/// Remote model download/delete/check, owned by the platform.
///
/// The request is the caller's argument object, untouched.
pub trait ModelManager: Send + Sync {
    fn manage(
        &self,
        model: &RemoteModel,
        request: &serde_json::Value,
    ) -> Pending<serde_json::Value>;
}
