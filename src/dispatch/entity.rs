//! `nlp#startEntityExtractor` and `nlp#manageEntityExtractionModels`.

use super::MethodCall;
use crate::encode::{encode_annotations, AnnotationDocument};
use crate::engine::entity::validate_language;
use crate::engine::{self, ExtractionParams, ModelManager, RemoteModel};
use crate::error::BridgeError;
use crate::lifecycle::RecognizerLifecycle;
use serde_json::Value;
use std::collections::BTreeSet;

/// Build extraction params from `text` and the optional `parameters` object.
///
/// Absent options stay `None`; nothing is defaulted.
pub(super) fn extraction_params(
    text: &str,
    parameters: Option<&Value>,
) -> Result<ExtractionParams, BridgeError> {
    let mut params = ExtractionParams::new(text);

    let parameters = match parameters {
        None => return Ok(params),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(BridgeError::InvalidArgument(
                "argument 'parameters' must be an object".to_string(),
            ))
        }
    };

    if let Some(filters) = parameters.get("filters").filter(|v| !v.is_null()) {
        let items = filters.as_array().ok_or_else(|| {
            BridgeError::InvalidArgument("'filters' must be a list of entity types".to_string())
        })?;
        let set = items
            .iter()
            .map(|v| {
                v.as_i64().and_then(|n| i32::try_from(n).ok()).ok_or_else(|| {
                    BridgeError::InvalidArgument(format!("invalid entity type filter {}", v))
                })
            })
            .collect::<Result<BTreeSet<i32>, _>>()?;
        params.entity_types_filter = Some(set);
    }

    params.preferred_locale = optional_string(parameters, "locale")?;
    params.reference_time_zone = optional_string(parameters, "timezone")?;

    Ok(params)
}

fn optional_string(
    map: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<String>, BridgeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(BridgeError::InvalidArgument(format!("'{}' must be a string", key))),
    }
}

pub(super) async fn extract_entities(
    lifecycle: &RecognizerLifecycle,
    call: &MethodCall,
) -> Result<Vec<AnnotationDocument>, BridgeError> {
    let language = validate_language(call.required_str("language")?)?;
    let text = call.required_str("text")?;
    let params = extraction_params(text, call.argument("parameters"))?;

    let handle = lifecycle.acquire_entity(language)?;

    let start = std::time::Instant::now();
    let pending = handle.engine()?.annotate(params);
    let annotations = engine::complete(pending).await.map_err(|e| {
        log::warn!("[ENTITY] Extractor #{} failed: {}", handle.id(), e);
        BridgeError::Extraction(e.message)
    })?;

    log::info!(
        "[ENTITY] {} annotations ({}) in {}ms",
        annotations.len(),
        language,
        start.elapsed().as_millis()
    );
    Ok(encode_annotations(&annotations))
}

/// Forward the whole argument object to the model manager, uninterpreted.
pub(super) async fn manage_model(
    manager: &dyn ModelManager,
    call: &MethodCall,
) -> Result<Value, BridgeError> {
    let model_id = call.required_str("model")?.trim();
    if model_id.is_empty() {
        return Err(BridgeError::InvalidArgument("argument 'model' must not be empty".to_string()));
    }
    let model = RemoteModel {
        model_id: model_id.to_string(),
    };

    log::info!("[MODEL] Forwarding request for '{}'", model.model_id);
    let pending = manager.manage(&model, &call.arguments);
    engine::complete(pending)
        .await
        .map_err(|e| BridgeError::ModelManagement(e.message))
}
