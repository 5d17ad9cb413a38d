//! Records built from segment groups.
//!
//! A [`Record`] is the typed result of running a record creator over one
//! segment group: the kind of segment it came from plus an ordered map of
//! named attributes.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents different types of field values in a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    String(String),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::DateTime(dt) => write!(f, "{}", dt),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// The segment kind a record was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    InterchangeHeader,
    MessageBeginning,
    Registration,
    Patient,
    MessageTrailer,
    InterchangeTrailer,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::InterchangeHeader,
        RecordKind::MessageBeginning,
        RecordKind::Registration,
        RecordKind::Patient,
        RecordKind::MessageTrailer,
        RecordKind::InterchangeTrailer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::InterchangeHeader => "interchange_header",
            RecordKind::MessageBeginning => "message_beginning",
            RecordKind::Registration => "registration",
            RecordKind::Patient => "patient",
            RecordKind::MessageTrailer => "message_trailer",
            RecordKind::InterchangeTrailer => "interchange_trailer",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for record creation
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    RequiredFieldMissing {
        kind: RecordKind,
        field: String,
    },
    InvalidFieldValue {
        kind: RecordKind,
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::RequiredFieldMissing { kind, field } => {
                write!(f, "Required field '{}' of {} is missing or empty", field, kind)
            }
            RecordError::InvalidFieldValue { kind, field, value, reason } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}' of {}: {}",
                    value, field, kind, reason
                )
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// A record created from one segment group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    kind: RecordKind,
    attributes: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Attribute value by name; `None` if the schema never declared it.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_int)
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Convert record to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
