//! Bounding boxes and corner polygons as document values.

use crate::engine::text::{Point, Rect};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RectDocument {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointDocument {
    pub x: i32,
    pub y: i32,
}

/// Missing boxes stay missing (serialized as `null`).
pub fn encode_rect(rect: Option<&Rect>) -> Option<RectDocument> {
    rect.map(|r| RectDocument {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    })
}

/// Corner points in engine order.
pub fn encode_points(points: &[Point]) -> Vec<PointDocument> {
    points
        .iter()
        .map(|p| PointDocument { x: p.x, y: p.y })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rect_keeps_all_four_edges() {
        let rect = Rect { left: 4, top: 8, right: 120, bottom: 40 };
        let doc = encode_rect(Some(&rect));
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            json!({ "left": 4, "top": 8, "right": 120, "bottom": 40 })
        );
    }

    #[test]
    fn absent_rect_is_null() {
        assert_eq!(serde_json::to_value(encode_rect(None)).unwrap(), json!(null));
    }

    #[test]
    fn points_preserve_order() {
        let points = [
            Point { x: 10, y: 0 },
            Point { x: 0, y: 0 },
            Point { x: 0, y: 5 },
            Point { x: -3, y: 5 },
        ];
        let encoded = encode_points(&points);
        let xs: Vec<i32> = encoded.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10, 0, 0, -3]);
    }
}
