//! Configurable runtime for interchange deserialisation.
//!
//! This module provides the tag vocabulary and parser configuration, the
//! schema-driven record creators, and the state machine that assembles an
//! interchange tree from a flat segment sequence.

pub mod config_loader;
pub mod creators;
pub mod deserialiser;
pub mod schema;

// Re-export key types
pub use config_loader::{ConfigError, ParseMode, ParserConfig, SegmentRole, TagSet};
pub use creators::{RecordCreator, SchemaCreator};
pub use deserialiser::{DeserialiseError, Deserialiser};
pub use schema::{FieldSpec, FieldType, Schemas};
