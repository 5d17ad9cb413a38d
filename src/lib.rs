//! # edifact-inbound: Registration Interchange Deserialiser
//!
//! Turns a flat sequence of EDIFACT-style segments into a typed tree:
//! an interchange of messages, each message a list of registration
//! transactions with optional patient details.
//!
//! ## Features
//!
//! - **Tokenizer**: Element/component splitting with release characters and `UNA` advice
//! - **Segment-group extraction**: Pure slicing of a line sequence up to a boundary tag
//! - **Schema-driven records**: Attributes declared per segment kind in YAML, typed with chrono
//! - **Deserialiser state machine**: Lenient (legacy) or strict handling of unterminated input
//! - **Structural validation**: Trailer counts checked against the parsed tree
//!
//! ## Example
//!
//! ```
//! let lines = [
//!     "UNB+UNOA:2+TES5+XX11+920113:1317+00000002",
//!     "UNH+00000003+FHSREG:0:1:FH:FHS001",
//!     "BGM+++507",
//!     "S01+1",
//!     "RFF+TN:17",
//!     "UNT+5+00000003",
//!     "UNZ+1+00000002",
//! ];
//!
//! let interchange = edifact_inbound::convert(&lines).unwrap().unwrap();
//! let transaction = &interchange.messages()[0].transactions()[0];
//!
//! assert_eq!(transaction.registration().get_int("transaction_number"), Some(17));
//! assert!(transaction.patient().is_none());
//! ```
//!
//! ## Configuration
//!
//! ```yaml
//! mode: strict
//! tags:
//!   registration: S01
//!   patient: S02
//! schemas:
//!   patient:
//!     - name: nhs_number
//!       path: PNA[PAT]+2:0
//!       type: string
//!       required: true
//! ```

// Core modules
pub mod extraction;
pub mod model;
pub mod record;
pub mod segment;
pub mod serialization;
pub mod validation;

pub mod logging;

// Configurable deserialisation runtime
pub mod runtime;

pub use extraction::{extract, FieldPath, FieldSource, SegmentGroup};
pub use model::{Interchange, Message, Transaction};
pub use record::{FieldValue, Record, RecordError, RecordKind};
pub use runtime::{
    ConfigError, DeserialiseError, Deserialiser, FieldSpec, FieldType, ParseMode, ParserConfig,
    RecordCreator, SchemaCreator, Schemas, SegmentRole, TagSet,
};
pub use segment::{Delimiters, Line};
pub use serialization::{NdjsonWriter, OutputFormat, SerializationError};
pub use validation::{validate, StructuralFault, ValidationReport};

/// Deserialise raw segment lines with the default configuration.
///
/// Lenient mode: returns `Ok(None)` when the input never reaches an
/// interchange trailer.
pub fn convert<S: AsRef<str>>(lines: &[S]) -> Result<Option<Interchange>, DeserialiseError> {
    Deserialiser::default().convert(lines)
}
