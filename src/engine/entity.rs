//! Native entity extractor types.
//!
//! `EntityKind` is the engine's tagged union. Kinds added by a newer
//! engine arrive as `Unknown(code)` and carry only the common fields.

use crate::error::BridgeError;
use std::collections::BTreeSet;

pub const TYPE_ADDRESS: i32 = 1;
pub const TYPE_DATE_TIME: i32 = 2;
pub const TYPE_EMAIL: i32 = 3;
pub const TYPE_FLIGHT_NUMBER: i32 = 4;
pub const TYPE_IBAN: i32 = 5;
pub const TYPE_ISBN: i32 = 6;
pub const TYPE_PAYMENT_CARD: i32 = 7;
pub const TYPE_PHONE: i32 = 8;
pub const TYPE_TRACKING_NUMBER: i32 = 9;
pub const TYPE_URL: i32 = 10;
pub const TYPE_MONEY: i32 = 11;

/// Language models the extractor ships.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "arabic",
    "chinese",
    "dutch",
    "english",
    "french",
    "german",
    "italian",
    "japanese",
    "korean",
    "polish",
    "portuguese",
    "russian",
    "spanish",
    "thai",
    "turkish",
];

/// Check a language model identifier before any extractor is built.
pub fn validate_language(language: &str) -> Result<&str, BridgeError> {
    let trimmed = language.trim();
    if SUPPORTED_LANGUAGES.contains(&trimmed) {
        Ok(trimmed)
    } else {
        Err(BridgeError::Configuration(format!(
            "Unsupported entity extraction language '{}'",
            language
        )))
    }
}

/// DateTime precision as reported by the engine (zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeGranularity {
    Year = 0,
    Month = 1,
    Week = 2,
    Day = 3,
    Hour = 4,
    Minute = 5,
    Second = 6,
}

impl DateTimeGranularity {
    pub const ALL: [DateTimeGranularity; 7] = [
        DateTimeGranularity::Year,
        DateTimeGranularity::Month,
        DateTimeGranularity::Week,
        DateTimeGranularity::Day,
        DateTimeGranularity::Hour,
        DateTimeGranularity::Minute,
        DateTimeGranularity::Second,
    ];

    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Address,
    DateTime {
        granularity: DateTimeGranularity,
        timestamp_millis: i64,
    },
    Email,
    FlightNumber {
        airline_code: String,
        flight_number: String,
    },
    Iban {
        iban: String,
        country_code: String,
    },
    Isbn {
        isbn: String,
    },
    PaymentCard {
        network: String,
        number: String,
    },
    Phone,
    TrackingNumber {
        carrier: String,
        number: String,
    },
    Url,
    Money {
        integer_part: i64,
        fractional_part: i64,
        unnormalized_currency: String,
    },
    Unknown(i32),
}

impl EntityKind {
    /// The engine's type constant for this kind.
    pub fn type_code(&self) -> i32 {
        match self {
            EntityKind::Address => TYPE_ADDRESS,
            EntityKind::DateTime { .. } => TYPE_DATE_TIME,
            EntityKind::Email => TYPE_EMAIL,
            EntityKind::FlightNumber { .. } => TYPE_FLIGHT_NUMBER,
            EntityKind::Iban { .. } => TYPE_IBAN,
            EntityKind::Isbn { .. } => TYPE_ISBN,
            EntityKind::PaymentCard { .. } => TYPE_PAYMENT_CARD,
            EntityKind::Phone => TYPE_PHONE,
            EntityKind::TrackingNumber { .. } => TYPE_TRACKING_NUMBER,
            EntityKind::Url => TYPE_URL,
            EntityKind::Money { .. } => TYPE_MONEY,
            EntityKind::Unknown(code) => *code,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Engine's default textual rendering of the entity.
    pub raw: String,
    pub kind: EntityKind,
}

/// One annotated span of the input.
///
/// `start`/`end` are UTF-16 offsets as the engine reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAnnotation {
    pub annotated_text: String,
    pub start: i32,
    pub end: i32,
    pub entities: Vec<Entity>,
}

/// Input to `EntityExtractor::annotate`. Absent options stay absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionParams {
    pub text: String,
    pub entity_types_filter: Option<BTreeSet<i32>>,
    pub preferred_locale: Option<String>,
    pub reference_time_zone: Option<String>,
}

impl ExtractionParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}
