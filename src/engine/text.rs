//! Native text recognizer output.
//!
//! Mirrors the engine's three-level tree: a `Text` holds blocks, blocks
//! hold lines, lines hold elements. Geometry is in source pixel space.

use crate::error::BridgeError;

/// Script model the recognizer is built for. Wire value is the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin = 0,
    Chinese = 1,
    Devanagari = 2,
    Japanese = 3,
    Korean = 4,
}

impl Script {
    pub const ALL: [Script; 5] = [
        Script::Latin,
        Script::Chinese,
        Script::Devanagari,
        Script::Japanese,
        Script::Korean,
    ];

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Chinese => "chinese",
            Script::Devanagari => "devanagari",
            Script::Japanese => "japanese",
            Script::Korean => "korean",
        }
    }

    pub fn from_index(index: i64) -> Result<Self, BridgeError> {
        Script::ALL
            .into_iter()
            .find(|s| s.index() == index)
            .ok_or_else(|| {
                BridgeError::Configuration(format!("Unsupported script index {}", index))
            })
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Full recognizer result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: String,
    pub blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub text: String,
    pub bounding_box: Option<Rect>,
    pub corner_points: Vec<Point>,
    pub recognized_language: Option<String>,
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub text: String,
    pub bounding_box: Option<Rect>,
    pub corner_points: Vec<Point>,
    pub recognized_language: Option<String>,
    pub elements: Vec<TextElement>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextElement {
    pub text: String,
    pub bounding_box: Option<Rect>,
    pub corner_points: Vec<Point>,
    pub recognized_language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_indices_round_trip() {
        for script in Script::ALL {
            assert_eq!(Script::from_index(script.index()).unwrap(), script);
        }
    }

    #[test]
    fn out_of_range_script_is_configuration_error() {
        for bad in [-1, 5, 42] {
            let err = Script::from_index(bad).unwrap_err();
            assert!(matches!(err, BridgeError::Configuration(_)));
        }
    }
}
