//! `vision#startTextRecognizer` — image in, recognition tree out.

use super::MethodCall;
use crate::encode::{encode_text, TextDocument};
use crate::engine::{self, Script};
use crate::error::BridgeError;
use crate::input_image;
use crate::lifecycle::RecognizerLifecycle;

/// Convert the image, pick the recognizer for `script`, run it, encode the result.
///
/// The image is converted before any engine is touched so a bad
/// descriptor never costs a recognizer rebuild.
pub(super) async fn recognize(
    lifecycle: &RecognizerLifecycle,
    call: &MethodCall,
) -> Result<TextDocument, BridgeError> {
    let image = input_image::from_image_data(call.required("imageData")?)?;

    let index = call.required("script")?.as_i64().ok_or_else(|| {
        BridgeError::InvalidArgument("argument 'script' must be an integer".to_string())
    })?;
    let script = Script::from_index(index)?;

    let handle = lifecycle.acquire_text(script)?;

    let start = std::time::Instant::now();
    let pending = handle.engine()?.process(image);
    let text = engine::complete(pending).await.map_err(|e| {
        log::warn!("[TEXT] Recognizer #{} failed: {}", handle.id(), e);
        BridgeError::Recognition(e.message)
    })?;

    let document = encode_text(&text);
    log::info!(
        "[TEXT] {} blocks, {} elements ({}) in {}ms",
        document.blocks.len(),
        document.element_count(),
        script,
        start.elapsed().as_millis()
    );
    Ok(document)
}

