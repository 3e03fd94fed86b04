//! Result encoders — native engine output → plain serializable documents.
//!
//! Nothing engine-specific leaves this module: documents contain only
//! strings, integers, arrays and string-keyed objects.

pub mod entity_fields;
pub mod geometry;
pub mod text_tree;

pub use entity_fields::{encode_annotations, entity_fields, AnnotationDocument};
pub use text_tree::{encode_text, TextDocument};
