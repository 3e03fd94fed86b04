//! Recognizer tree encoder.
//!
//! Walks Text → blocks → lines → elements depth-first in engine order
//! (the engine's reading order; nothing is re-sorted here).

use super::geometry::{encode_points, encode_rect, PointDocument, RectDocument};
use crate::engine::text::{Point, Rect, Text, TextBlock, TextElement, TextLine};
use serde::Serialize;

/// Fields shared by every node level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFields {
    pub text: String,
    pub rect: Option<RectDocument>,
    pub points: Vec<PointDocument>,
    /// Always exactly one entry; `None` when the engine reported no language.
    pub recognized_languages: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDocument {
    pub text: String,
    pub blocks: Vec<BlockNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockNode {
    #[serde(flatten)]
    pub fields: NodeFields,
    pub lines: Vec<LineNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineNode {
    #[serde(flatten)]
    pub fields: NodeFields,
    pub elements: Vec<ElementNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    #[serde(flatten)]
    pub fields: NodeFields,
}

impl TextDocument {
    /// Number of leaf elements across the whole tree.
    pub fn element_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| &b.lines)
            .map(|l| l.elements.len())
            .sum()
    }
}

pub fn encode_text(text: &Text) -> TextDocument {
    TextDocument {
        text: text.text.clone(),
        blocks: text.blocks.iter().map(encode_block).collect(),
    }
}

fn encode_block(block: &TextBlock) -> BlockNode {
    BlockNode {
        fields: node_fields(
            &block.text,
            block.bounding_box.as_ref(),
            &block.corner_points,
            block.recognized_language.as_deref(),
        ),
        lines: block.lines.iter().map(encode_line).collect(),
    }
}

fn encode_line(line: &TextLine) -> LineNode {
    LineNode {
        fields: node_fields(
            &line.text,
            line.bounding_box.as_ref(),
            &line.corner_points,
            line.recognized_language.as_deref(),
        ),
        elements: line.elements.iter().map(encode_element).collect(),
    }
}

fn encode_element(element: &TextElement) -> ElementNode {
    ElementNode {
        fields: node_fields(
            &element.text,
            element.bounding_box.as_ref(),
            &element.corner_points,
            element.recognized_language.as_deref(),
        ),
    }
}

fn node_fields(
    text: &str,
    rect: Option<&Rect>,
    points: &[Point],
    language: Option<&str>,
) -> NodeFields {
    NodeFields {
        text: text.to_string(),
        rect: encode_rect(rect),
        points: encode_points(points),
        // Always one entry; null when the engine reported no language.
        recognized_languages: vec![language.map(str::to_string)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(text: &str) -> TextElement {
        TextElement {
            text: text.to_string(),
            bounding_box: Some(Rect { left: 0, top: 0, right: 10, bottom: 10 }),
            corner_points: vec![
                Point { x: 0, y: 0 },
                Point { x: 10, y: 0 },
                Point { x: 10, y: 10 },
                Point { x: 0, y: 10 },
            ],
            recognized_language: Some("en".to_string()),
        }
    }

    /// Synthetic tree with `n` blocks × `m` lines × `k` elements named "b.l.e".
    fn synthetic(n: usize, m: usize, k: usize) -> Text {
        let blocks = (0..n)
            .map(|b| TextBlock {
                text: format!("block {}", b),
                lines: (0..m)
                    .map(|l| TextLine {
                        text: format!("line {}.{}", b, l),
                        elements: (0..k).map(|e| element(&format!("{}.{}.{}", b, l, e))).collect(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
            .collect();
        Text { text: "full".to_string(), blocks }
    }

    #[test]
    fn element_count_and_order_are_preserved() {
        let doc = encode_text(&synthetic(3, 4, 5));
        assert_eq!(doc.element_count(), 3 * 4 * 5);

        let leaves: Vec<&str> = doc
            .blocks
            .iter()
            .flat_map(|b| &b.lines)
            .flat_map(|l| &l.elements)
            .map(|e| e.fields.text.as_str())
            .collect();
        assert_eq!(leaves.first(), Some(&"0.0.0"));
        assert_eq!(leaves[5], "0.1.0");
        assert_eq!(leaves.last(), Some(&"2.3.4"));
    }

    #[test]
    fn recognized_languages_always_has_one_entry() {
        let doc = encode_text(&synthetic(2, 2, 2));
        for block in &doc.blocks {
            assert_eq!(block.fields.recognized_languages, vec![None]);
            for line in &block.lines {
                assert_eq!(line.fields.recognized_languages.len(), 1);
                for el in &line.elements {
                    assert_eq!(el.fields.recognized_languages, vec![Some("en".to_string())]);
                }
            }
        }
    }

    #[test]
    fn empty_levels_encode_as_empty_arrays() {
        let text = Text {
            text: String::new(),
            blocks: vec![TextBlock::default()],
        };
        let value = serde_json::to_value(encode_text(&text)).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "",
                "blocks": [{
                    "text": "",
                    "rect": null,
                    "points": [],
                    "recognizedLanguages": [null],
                    "lines": []
                }]
            })
        );
    }

    #[test]
    fn wire_shape_of_an_element() {
        let value = serde_json::to_value(encode_element(&element("Hi"))).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "Hi",
                "rect": { "left": 0, "top": 0, "right": 10, "bottom": 10 },
                "points": [
                    { "x": 0, "y": 0 },
                    { "x": 10, "y": 0 },
                    { "x": 10, "y": 10 },
                    { "x": 0, "y": 10 }
                ],
                "recognizedLanguages": ["en"]
            })
        );
    }
}
