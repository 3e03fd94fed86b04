//! mlkit-bridge — on-device text recognition and entity extraction over a
//! call/response channel.
//!
//! This is the wiring layer. Engines are supplied by the platform through
//! `engine::EngineProvider`; this crate decides which engine instance
//! serves a call and re-encodes the engine output as plain JSON.
//!
//! Modules:
//!   - dispatch     — named operations → capability handlers
//!   - lifecycle    — one engine slot per capability, cache/fresh policies
//!   - encode       — recognition tree, entity fields, geometry encoders
//!   - engine       — black-box engine contracts and native result types
//!   - input_image  — `imageData` descriptor conversion
//!   - channel      — NDJSON transport (stdin/stdout or any byte stream)
//!   - config       — config file + env overrides

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod encode;
pub mod engine;
pub mod error;
pub mod input_image;
pub mod lifecycle;

pub use config::BridgeConfig;
pub use dispatch::{MethodCall, MethodResult, OperationDispatcher};
pub use error::BridgeError;
pub use lifecycle::{Capability, RecognizerLifecycle};

use engine::{EngineProvider, ModelManager};
use std::sync::Arc;

/// Load `.env.local` → `.env` from the working directory, then start logging.
pub fn init() {
    'env_load: for env_file in [".env.local", ".env"] {
        let path = std::path::Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    let _ = env_logger::try_init();
}

/// Entry point for a platform host: serve calls on stdin/stdout until EOF.
pub async fn run(
    provider: Arc<dyn EngineProvider>,
    model_manager: Option<Arc<dyn ModelManager>>,
) -> Result<(), BridgeError> {
    init();
    let config = BridgeConfig::load()?;
    log::info!("mlkit-bridge starting up");

    let mut dispatcher = OperationDispatcher::new(provider);
    if let Some(manager) = model_manager {
        dispatcher = dispatcher.with_model_manager(manager);
    }

    // Build the recognizer ahead of the first frame to avoid a cold start.
    if let Some(script) = config.warm_up_script()? {
        if let Err(e) = dispatcher.warm_up(script) {
            log::warn!("[TEXT] Warm-up failed: {}", e);
        }
    }

    channel::serve_stdio(Arc::new(dispatcher), config.max_request_bytes)
        .await
        .map_err(|e| BridgeError::Channel(e.to_string()))
}
