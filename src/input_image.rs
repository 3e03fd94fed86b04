//! Image descriptor conversion.
//!
//! Turns the caller's `imageData` object into the representation the
//! recognizer consumes. Two descriptor kinds are accepted:
//!
//!   - `{"type": "file", "path": ...}` — decoded from disk with the `image` crate
//!   - `{"type": "bytes", "bytes": ..., "metadata": {...}}` — raw camera planes
//!
//! Raw bytes may arrive as a base64 string or as an array of numbers.

use crate::error::BridgeError;
use base64::Engine as _;
use image::DynamicImage;
use serde_json::Value;

/// Pixel layout of a raw camera frame. Wire values are the platform constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    Nv21,
    Yv12,
    Yuv420888,
    Bgra8888,
}

impl RawFormat {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            17 => Some(RawFormat::Nv21),
            842094169 => Some(RawFormat::Yv12),
            35 => Some(RawFormat::Yuv420888),
            1111970369 => Some(RawFormat::Bgra8888),
            _ => None,
        }
    }

    /// Smallest buffer that can hold a `width`×`height` frame, `None` if
    /// that size is not addressable.
    fn min_len(self, width: u32, height: u32) -> Option<usize> {
        let pixels = (width as usize).checked_mul(height as usize)?;
        match self {
            RawFormat::Nv21 | RawFormat::Yv12 | RawFormat::Yuv420888 => {
                pixels.checked_mul(3).map(|n| n / 2)
            }
            RawFormat::Bgra8888 => pixels.checked_mul(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub rotation: u32,
    pub format: RawFormat,
}

#[derive(Debug, Clone)]
pub enum InputImage {
    Bitmap(DynamicImage),
    Raw { bytes: Vec<u8>, metadata: ImageMetadata },
}

impl InputImage {
    pub fn width(&self) -> u32 {
        match self {
            InputImage::Bitmap(img) => img.width(),
            InputImage::Raw { metadata, .. } => metadata.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            InputImage::Bitmap(img) => img.height(),
            InputImage::Raw { metadata, .. } => metadata.height,
        }
    }
}

/// Convert an `imageData` argument into an `InputImage`.
pub fn from_image_data(data: &Value) -> Result<InputImage, BridgeError> {
    let kind = data
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::InputImage("imageData is missing 'type'".to_string()))?;

    match kind {
        "file" => {
            let path = data
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    BridgeError::InputImage("file image is missing 'path'".to_string())
                })?;
            let img = image::open(path)
                .map_err(|e| BridgeError::InputImage(format!("Failed to decode {}: {}", path, e)))?;
            Ok(InputImage::Bitmap(img))
        }
        "bytes" => {
            let bytes = decode_bytes(data.get("bytes"))?;
            let metadata = parse_metadata(data.get("metadata"))?;
            let needed = metadata
                .format
                .min_len(metadata.width, metadata.height)
                .ok_or_else(|| {
                    BridgeError::InputImage(format!(
                        "{}x{} frame is too large",
                        metadata.width, metadata.height
                    ))
                })?;
            if bytes.len() < needed {
                return Err(BridgeError::InputImage(format!(
                    "{} bytes is too small for a {}x{} {:?} frame (need {})",
                    bytes.len(),
                    metadata.width,
                    metadata.height,
                    metadata.format,
                    needed
                )));
            }
            Ok(InputImage::Raw { bytes, metadata })
        }
        other => Err(BridgeError::InputImage(format!("Unsupported image type '{}'", other))),
    }
}

fn decode_bytes(value: Option<&Value>) -> Result<Vec<u8>, BridgeError> {
    match value {
        Some(Value::String(encoded)) => base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| BridgeError::InputImage(format!("Invalid base64 image bytes: {}", e))),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| {
                        BridgeError::InputImage("Image bytes must be 0-255".to_string())
                    })
            })
            .collect(),
        _ => Err(BridgeError::InputImage("bytes image is missing 'bytes'".to_string())),
    }
}

fn parse_metadata(value: Option<&Value>) -> Result<ImageMetadata, BridgeError> {
    let meta = value
        .and_then(Value::as_object)
        .ok_or_else(|| BridgeError::InputImage("bytes image is missing 'metadata'".to_string()))?;

    let dimension = |key: &str| -> Result<u32, BridgeError> {
        meta.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                BridgeError::InputImage(format!("metadata '{}' must be a positive integer", key))
            })
    };

    let width = dimension("width")?;
    let height = dimension("height")?;

    let rotation = meta.get("rotation").and_then(Value::as_u64).unwrap_or(0);
    if !matches!(rotation, 0 | 90 | 180 | 270) {
        return Err(BridgeError::InputImage(format!("Unsupported rotation {}", rotation)));
    }

    let format_code = meta
        .get("image_format")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            BridgeError::InputImage("metadata is missing 'image_format'".to_string())
        })?;
    let format = RawFormat::from_code(format_code).ok_or_else(|| {
        BridgeError::InputImage(format!("Unsupported image format {}", format_code))
    })?;

    Ok(ImageMetadata {
        width,
        height,
        rotation: rotation as u32,
        format,
    })
}
