//! Declared record schemas.
//!
//! Each record kind has an ordered list of [`FieldSpec`]s mapping a position
//! inside a segment group to a named, typed attribute.

use serde::{Deserialize, Serialize};

use crate::extraction::FieldPath;
use crate::record::RecordKind;

/// Field definition from YAML.
///
/// ```yaml
/// - name: transaction_number
///   path: "RFF[TN]+1:1"
///   type: integer
///   required: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Attribute name on the created record
    pub name: String,

    /// Where the value lives inside the segment group
    pub path: FieldPath,

    /// Expected value type
    #[serde(flatten)]
    pub field_type: FieldType,

    /// Fail record creation when the value is missing or empty
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &str, path: FieldPath, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            path,
            field_type,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Value type of a field; dates carry a chrono format string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Date { format: String },
    DateTime { format: String },
}

/// Field lists for every record kind.
///
/// Kinds missing from a YAML file keep their built-in schema; an explicit
/// empty list produces records without attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schemas {
    pub interchange_header: Vec<FieldSpec>,
    pub message_beginning: Vec<FieldSpec>,
    pub registration: Vec<FieldSpec>,
    pub patient: Vec<FieldSpec>,
    pub message_trailer: Vec<FieldSpec>,
    pub interchange_trailer: Vec<FieldSpec>,
}

impl Schemas {
    pub fn get(&self, kind: RecordKind) -> &[FieldSpec] {
        match kind {
            RecordKind::InterchangeHeader => &self.interchange_header,
            RecordKind::MessageBeginning => &self.message_beginning,
            RecordKind::Registration => &self.registration,
            RecordKind::Patient => &self.patient,
            RecordKind::MessageTrailer => &self.message_trailer,
            RecordKind::InterchangeTrailer => &self.interchange_trailer,
        }
    }

    /// Schemas with no fields at all.
    pub fn empty() -> Self {
        Self {
            interchange_header: Vec::new(),
            message_beginning: Vec::new(),
            registration: Vec::new(),
            patient: Vec::new(),
            message_trailer: Vec::new(),
            interchange_trailer: Vec::new(),
        }
    }
}

fn path(segment: &str, qualifier: Option<&str>, element: usize, component: Option<usize>) -> FieldPath {
    FieldPath {
        segment: segment.to_string(),
        qualifier: qualifier.map(str::to_string),
        element,
        component,
    }
}

fn date_time(format: &str) -> FieldType {
    FieldType::DateTime {
        format: format.to_string(),
    }
}

/// Registration feed layout.
impl Default for Schemas {
    fn default() -> Self {
        Self {
            interchange_header: vec![
                FieldSpec::new("sender", path("UNB", None, 2, Some(0)), FieldType::String),
                FieldSpec::new("recipient", path("UNB", None, 3, Some(0)), FieldType::String),
                FieldSpec::new("date_time", path("UNB", None, 4, None), date_time("%y%m%d:%H%M")),
                FieldSpec::new("sequence_number", path("UNB", None, 5, Some(0)), FieldType::Integer),
            ],
            message_beginning: vec![
                FieldSpec::new("party_id", path("NAD", Some("FHS"), 2, Some(0)), FieldType::String),
                FieldSpec::new("date_time", path("DTM", Some("137"), 1, Some(1)), date_time("%Y%m%d%H%M")),
                FieldSpec::new("reference_number", path("RFF", Some("950"), 1, Some(1)), FieldType::String),
            ],
            registration: vec![
                FieldSpec::new("transaction_number", path("RFF", Some("TN"), 1, Some(1)), FieldType::Integer),
                FieldSpec::new("party_id", path("NAD", Some("GP"), 2, Some(0)), FieldType::String),
            ],
            patient: vec![
                FieldSpec::new("nhs_number", path("PNA", Some("PAT"), 2, Some(0)), FieldType::String),
                FieldSpec::new("surname", path("PNA", Some("PAT"), 5, Some(1)), FieldType::String),
                FieldSpec::new("forename", path("PNA", Some("PAT"), 6, Some(1)), FieldType::String),
                FieldSpec::new(
                    "date_of_birth",
                    path("DTM", Some("329"), 1, Some(1)),
                    FieldType::Date {
                        format: "%Y%m%d".to_string(),
                    },
                ),
            ],
            message_trailer: vec![
                FieldSpec::new("segment_count", path("UNT", None, 1, Some(0)), FieldType::Integer),
                FieldSpec::new("message_reference", path("UNT", None, 2, Some(0)), FieldType::String),
            ],
            interchange_trailer: vec![
                FieldSpec::new("message_count", path("UNZ", None, 1, Some(0)), FieldType::Integer),
                FieldSpec::new("interchange_reference", path("UNZ", None, 2, Some(0)), FieldType::String),
            ],
        }
    }
}
