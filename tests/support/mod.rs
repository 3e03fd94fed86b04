//! Shared test helpers: scripted fake engines.
//!
//! The fakes complete on a spawned task so every call goes through the
//! real asynchronous completion path.

#![allow(dead_code)]

use mlkit_bridge::engine::entity::{DateTimeGranularity, Entity, EntityKind};
use mlkit_bridge::engine::text::{Point, Rect, TextBlock, TextElement, TextLine};
use mlkit_bridge::engine::{
    pending, EngineError, EngineProvider, EntityAnnotation, EntityExtractor, ExtractionParams,
    ModelManager, Pending, RemoteModel, Script, Text, TextRecognizer,
};
use mlkit_bridge::input_image::InputImage;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the fakes observed.
#[derive(Default)]
pub struct Recorder {
    pub text_built: AtomicUsize,
    pub text_closed: AtomicUsize,
    pub entity_built: AtomicUsize,
    pub entity_closed: AtomicUsize,
    pub scripts: Mutex<Vec<Script>>,
    pub languages: Mutex<Vec<String>>,
    pub params: Mutex<Vec<ExtractionParams>>,
}

impl Recorder {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Holds a recognition until the test lets it go.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct FakeProvider {
    pub recorder: Arc<Recorder>,
    /// Scripts whose recognizer fails to build.
    pub unavailable_scripts: Vec<Script>,
    /// Make every recognition fail with this message.
    pub recognition_failure: Option<String>,
    /// Make every extraction fail with this message.
    pub extraction_failure: Option<String>,
    pub gate: Option<Arc<Gate>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EngineProvider for FakeProvider {
    fn text_recognizer(&self, script: Script) -> Result<Box<dyn TextRecognizer>, EngineError> {
        if self.unavailable_scripts.contains(&script) {
            return Err(EngineError::new(format!("{} model is not available", script)));
        }
        self.recorder.text_built.fetch_add(1, Ordering::SeqCst);
        self.recorder.scripts.lock().unwrap().push(script);
        Ok(Box::new(FakeRecognizer {
            recorder: Arc::clone(&self.recorder),
            failure: self.recognition_failure.clone(),
            gate: self.gate.clone(),
        }))
    }

    fn entity_extractor(&self, language: &str) -> Result<Box<dyn EntityExtractor>, EngineError> {
        self.recorder.entity_built.fetch_add(1, Ordering::SeqCst);
        self.recorder.languages.lock().unwrap().push(language.to_string());
        Ok(Box::new(FakeExtractor {
            recorder: Arc::clone(&self.recorder),
            failure: self.extraction_failure.clone(),
        }))
    }
}

pub struct FakeRecognizer {
    recorder: Arc<Recorder>,
    failure: Option<String>,
    gate: Option<Arc<Gate>>,
}

impl TextRecognizer for FakeRecognizer {
    fn process(&self, image: InputImage) -> Pending<Text> {
        let (tx, rx) = pending();
        let failure = self.failure.clone();
        let gate = self.gate.clone();
        tokio::spawn(async move {
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            let result = match failure {
                Some(message) => Err(EngineError::new(message)),
                None => Ok(sample_text(image.width() as i32)),
            };
            let _ = tx.send(result);
        });
        rx
    }

    fn close(&self) -> Result<(), EngineError> {
        self.recorder.text_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeExtractor {
    recorder: Arc<Recorder>,
    failure: Option<String>,
}

impl EntityExtractor for FakeExtractor {
    fn annotate(&self, params: ExtractionParams) -> Pending<Vec<EntityAnnotation>> {
        self.recorder.params.lock().unwrap().push(params.clone());
        let (tx, rx) = pending();
        let failure = self.failure.clone();
        tokio::spawn(async move {
            let result = match failure {
                Some(message) => Err(EngineError::new(message)),
                None => Ok(scripted_annotations(&params)),
            };
            let _ = tx.send(result);
        });
        rx
    }

    fn close(&self) -> Result<(), EngineError> {
        self.recorder.entity_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Model manager that echoes what it was asked.
#[derive(Default)]
pub struct EchoModelManager {
    pub seen: Mutex<Vec<(RemoteModel, Value)>>,
}

impl ModelManager for EchoModelManager {
    fn manage(&self, model: &RemoteModel, request: &Value) -> Pending<Value> {
        self.seen.lock().unwrap().push((model.clone(), request.clone()));
        let (tx, rx) = pending();
        let reply = match request.get("task").and_then(Value::as_str) {
            Some("check") => Ok(json!(true)),
            Some("download") | Some("delete") => Ok(json!(true)),
            other => Err(EngineError::new(format!("unknown task {:?}", other))),
        };
        let _ = tx.send(reply);
        rx
    }
}

/// A tiny raw NV21 frame descriptor, `width` pixels wide.
pub fn nv21_image(width: u32) -> Value {
    let height = 2u32;
    let len = (width * height * 3 / 2) as usize;
    json!({
        "type": "bytes",
        "bytes": vec![0u8; len],
        "metadata": { "width": width, "height": height, "rotation": 0, "image_format": 17 }
    })
}

fn square(x: i32, y: i32, size: i32) -> (Option<Rect>, Vec<Point>) {
    (
        Some(Rect { left: x, top: y, right: x + size, bottom: y + size }),
        vec![
            Point { x, y },
            Point { x: x + size, y },
            Point { x: x + size, y: y + size },
            Point { x, y: y + size },
        ],
    )
}

/// One block, one line, two elements. The first element's width echoes the input width.
pub fn sample_text(width: i32) -> Text {
    let (block_box, block_points) = square(0, 0, width);
    let (hello_box, hello_points) = square(0, 0, 5);
    let elements = vec![
        TextElement {
            text: "Hello".to_string(),
            bounding_box: hello_box,
            corner_points: hello_points,
            recognized_language: Some("en".to_string()),
        },
        TextElement {
            text: "world".to_string(),
            bounding_box: None,
            corner_points: Vec::new(),
            recognized_language: None,
        },
    ];
    Text {
        text: "Hello world".to_string(),
        blocks: vec![TextBlock {
            text: "Hello world".to_string(),
            bounding_box: block_box,
            corner_points: block_points.clone(),
            recognized_language: Some("en".to_string()),
            lines: vec![TextLine {
                text: "Hello world".to_string(),
                bounding_box: block_box,
                corner_points: block_points,
                recognized_language: Some("en".to_string()),
                elements,
            }],
        }],
    }
}

fn utf16_offset(text: &str, byte_index: usize) -> i32 {
    text[..byte_index].encode_utf16().count() as i32
}

/// Recognises "10am" as an hour-granularity DateTime and "555-1234" as a Phone.
pub fn scripted_annotations(params: &ExtractionParams) -> Vec<EntityAnnotation> {
    let rules: [(&str, EntityKind); 2] = [
        (
            "10am",
            EntityKind::DateTime {
                granularity: DateTimeGranularity::Hour,
                timestamp_millis: 1_700_038_800_000,
            },
        ),
        ("555-1234", EntityKind::Phone),
    ];

    let mut found: Vec<(usize, EntityAnnotation)> = rules
        .into_iter()
        .filter(|(_, kind)| {
            params
                .entity_types_filter
                .as_ref()
                .map_or(true, |f| f.contains(&kind.type_code()))
        })
        .filter_map(|(needle, kind)| {
            let at = params.text.find(needle)?;
            Some((
                at,
                EntityAnnotation {
                    annotated_text: needle.to_string(),
                    start: utf16_offset(&params.text, at),
                    end: utf16_offset(&params.text, at + needle.len()),
                    entities: vec![Entity {
                        raw: format!("{:?}", kind),
                        kind,
                    }],
                },
            ))
        })
        .collect();
    found.sort_by_key(|(at, _)| *at);
    found.into_iter().map(|(_, a)| a).collect()
}
