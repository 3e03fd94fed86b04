//! Entity field extraction — one flat object per entity.
//!
//! Every entity carries `type` and `raw`. Kind-specific fields are added
//! on top; kinds without payload (and unknown kinds) carry nothing else.

use crate::engine::entity::{Entity, EntityAnnotation, EntityKind};
use serde::Serialize;
use serde_json::{Map, Value};

/// One annotated span, ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationDocument {
    pub text: String,
    pub start: i32,
    pub end: i32,
    pub entities: Vec<Map<String, Value>>,
}

pub fn entity_fields(entity: &Entity) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("type".into(), entity.kind.type_code().into());
    fields.insert("raw".into(), entity.raw.clone().into());

    match &entity.kind {
        EntityKind::Address | EntityKind::Url | EntityKind::Phone | EntityKind::Email => {}
        EntityKind::DateTime {
            granularity,
            timestamp_millis,
        } => {
            // Caller-side enum reserves index 0, so shift the engine ordinal by one.
            fields.insert("dateTimeGranularity".into(), (granularity.ordinal() + 1).into());
            fields.insert("timestamp".into(), (*timestamp_millis).into());
        }
        EntityKind::FlightNumber {
            airline_code,
            flight_number,
        } => {
            fields.insert("code".into(), airline_code.clone().into());
            fields.insert("number".into(), flight_number.clone().into());
        }
        EntityKind::Iban { iban, country_code } => {
            fields.insert("iban".into(), iban.clone().into());
            fields.insert("code".into(), country_code.clone().into());
        }
        EntityKind::Isbn { isbn } => {
            fields.insert("isbn".into(), isbn.clone().into());
        }
        EntityKind::Money {
            integer_part,
            fractional_part,
            unnormalized_currency,
        } => {
            fields.insert("fraction".into(), (*fractional_part).into());
            fields.insert("integer".into(), (*integer_part).into());
            fields.insert("unnormalized".into(), unnormalized_currency.clone().into());
        }
        EntityKind::PaymentCard { network, number } => {
            fields.insert("network".into(), network.clone().into());
            fields.insert("number".into(), number.clone().into());
        }
        EntityKind::TrackingNumber { carrier, number } => {
            fields.insert("carrier".into(), carrier.clone().into());
            fields.insert("number".into(), number.clone().into());
        }
        EntityKind::Unknown(code) => {
            log::debug!("[ENTITY] Unknown entity type {}, passing through type/raw only", code);
        }
    }

    fields
}

/// Encode annotations in engine order. Offsets are copied, never recomputed.
pub fn encode_annotations(annotations: &[EntityAnnotation]) -> Vec<AnnotationDocument> {
    annotations
        .iter()
        .map(|a| AnnotationDocument {
            text: a.annotated_text.clone(),
            start: a.start,
            end: a.end,
            entities: a.entities.iter().map(entity_fields).collect(),
        })
        .collect()
}
