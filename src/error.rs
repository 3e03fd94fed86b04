//! Error taxonomy reported back to the caller.
//!
//! Every variant maps to a stable wire code. Engine messages are carried
//! verbatim; nothing here retries or substitutes a fallback result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image conversion failed: {0}")]
    InputImage(String),

    #[error("Engine construction failed: {0}")]
    EngineConstruction(String),

    #[error("{0}")]
    Recognition(String),

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    ModelManagement(String),

    #[error("Engine handle #{0} was already released")]
    HandleReleased(u64),

    #[error("Channel I/O failed: {0}")]
    Channel(String),

    #[error("Result encoding failed: {0}")]
    Encoding(String),
}

impl BridgeError {
    /// Error code sent to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Configuration(_) => "ConfigurationError",
            BridgeError::InvalidArgument(_) => "InvalidArgument",
            BridgeError::InputImage(_) => "InputImageConverterError",
            BridgeError::EngineConstruction(_) => "EngineConstructionError",
            BridgeError::Recognition(_) => "TextRecognizerError",
            BridgeError::Extraction(_) => "EntityExtractorError",
            BridgeError::ModelManagement(_) => "ModelManagerError",
            BridgeError::HandleReleased(_) => "HandleReleasedError",
            BridgeError::Channel(_) => "ChannelError",
            BridgeError::Encoding(_) => "EncodingError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_messages_pass_through_unchanged() {
        let message = "Waiting for the text optional module to be downloaded";
        let err = BridgeError::Recognition(message.into());
        assert_eq!(err.to_string(), message);
        assert_eq!(err.code(), "TextRecognizerError");
    }

    #[test]
    fn codes_are_distinct() {
        let all = [
            BridgeError::Configuration(String::new()),
            BridgeError::InvalidArgument(String::new()),
            BridgeError::InputImage(String::new()),
            BridgeError::EngineConstruction(String::new()),
            BridgeError::Recognition(String::new()),
            BridgeError::Extraction(String::new()),
            BridgeError::ModelManagement(String::new()),
            BridgeError::HandleReleased(1),
            BridgeError::Channel(String::new()),
            BridgeError::Encoding(String::new()),
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), all.len());
    }
}
