//! Parser configuration loader and validation.
//!
//! Loads the tag vocabulary, delimiters, trailer policy and record schemas
//! from YAML. Every section is optional and falls back to the registration
//! feed defaults.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::RecordKind;
use crate::runtime::schema::{FieldType, Schemas};
use crate::segment::Delimiters;

/// How the deserialiser treats structures that are never closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// A missing interchange trailer yields no interchange; open messages are
    /// dropped with a warning.
    #[default]
    Lenient,

    /// Unterminated interchanges and messages are errors.
    Strict,
}

/// Structural role of a segment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    InterchangeHeader,
    MessageHeader,
    MessageBeginning,
    Registration,
    Patient,
    MessageTrailer,
    InterchangeTrailer,
}

impl SegmentRole {
    /// Record kind created for this role; the message header only marks a
    /// boundary.
    pub fn record_kind(&self) -> Option<RecordKind> {
        match self {
            SegmentRole::InterchangeHeader => Some(RecordKind::InterchangeHeader),
            SegmentRole::MessageHeader => None,
            SegmentRole::MessageBeginning => Some(RecordKind::MessageBeginning),
            SegmentRole::Registration => Some(RecordKind::Registration),
            SegmentRole::Patient => Some(RecordKind::Patient),
            SegmentRole::MessageTrailer => Some(RecordKind::MessageTrailer),
            SegmentRole::InterchangeTrailer => Some(RecordKind::InterchangeTrailer),
        }
    }
}

/// Tag vocabulary. Tags are case-significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagSet {
    pub interchange_header: String,
    pub message_header: String,
    pub message_beginning: String,
    pub registration: String,
    pub patient: String,
    pub message_trailer: String,
    pub interchange_trailer: String,
}

impl Default for TagSet {
    fn default() -> Self {
        Self {
            interchange_header: "UNB".to_string(),
            message_header: "UNH".to_string(),
            message_beginning: "BGM".to_string(),
            registration: "S01".to_string(),
            patient: "S02".to_string(),
            message_trailer: "UNT".to_string(),
            interchange_trailer: "UNZ".to_string(),
        }
    }
}

impl TagSet {
    /// Every role with its tag.
    pub fn entries(&self) -> [(SegmentRole, &str); 7] {
        [
            (SegmentRole::InterchangeHeader, self.interchange_header.as_str()),
            (SegmentRole::MessageHeader, self.message_header.as_str()),
            (SegmentRole::MessageBeginning, self.message_beginning.as_str()),
            (SegmentRole::Registration, self.registration.as_str()),
            (SegmentRole::Patient, self.patient.as_str()),
            (SegmentRole::MessageTrailer, self.message_trailer.as_str()),
            (SegmentRole::InterchangeTrailer, self.interchange_trailer.as_str()),
        ]
    }

    /// Role of `tag`, or `None` for tags outside the vocabulary.
    pub fn role_of(&self, tag: &str) -> Option<SegmentRole> {
        self.entries()
            .into_iter()
            .find(|(_, t)| *t == tag)
            .map(|(role, _)| role)
    }

    pub fn tag_for(&self, role: SegmentRole) -> &str {
        match role {
            SegmentRole::InterchangeHeader => &self.interchange_header,
            SegmentRole::MessageHeader => &self.message_header,
            SegmentRole::MessageBeginning => &self.message_beginning,
            SegmentRole::Registration => &self.registration,
            SegmentRole::Patient => &self.patient,
            SegmentRole::MessageTrailer => &self.message_trailer,
            SegmentRole::InterchangeTrailer => &self.interchange_trailer,
        }
    }
}

/// Error type for configuration loading and validation
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Yaml(serde_yaml::Error),
    InvalidTag {
        role: String,
        tag: String,
    },
    DuplicateTag(String),
    DuplicateDelimiter {
        first: String,
        second: String,
        delimiter: char,
    },
    InvalidFieldName {
        kind: RecordKind,
        name: String,
    },
    DuplicateField {
        kind: RecordKind,
        name: String,
    },
    InvalidFieldPath {
        kind: RecordKind,
        field: String,
        reason: String,
    },
    EmptyFormat {
        kind: RecordKind,
        field: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config file {}: {}", path, source)
            }
            ConfigError::Yaml(e) => write!(f, "Failed to parse YAML: {}", e),
            ConfigError::InvalidTag { role, tag } => {
                write!(f, "Tag '{}' for {} must be three upper-case letters or digits", tag, role)
            }
            ConfigError::DuplicateTag(tag) => write!(f, "Tag '{}' is assigned to more than one role", tag),
            ConfigError::DuplicateDelimiter { first, second, delimiter } => write!(
                f,
                "Delimiter '{}' is used as both the {} and the {} character",
                delimiter, first, second
            ),
            ConfigError::InvalidFieldName { kind, name } => {
                write!(f, "Field name '{}' in {} schema is not a snake_case identifier", name, kind)
            }
            ConfigError::DuplicateField { kind, name } => {
                write!(f, "Field '{}' is declared twice in {} schema", name, kind)
            }
            ConfigError::InvalidFieldPath { kind, field, reason } => {
                write!(f, "Field '{}' in {} schema has an invalid path: {}", field, kind, reason)
            }
            ConfigError::EmptyFormat { kind, field } => {
                write!(f, "Field '{}' in {} schema has an empty date format", field, kind)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

/// Parser configuration.
///
/// ```yaml
/// mode: strict
/// tags:
///   registration: S01
///   patient: S02
/// schemas:
///   registration:
///     - name: transaction_number
///       path: "RFF[TN]+1:1"
///       type: integer
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Trailer policy
    pub mode: ParseMode,

    /// Service characters used when tokenizing raw lines
    pub delimiters: Delimiters,

    /// Tag vocabulary
    pub tags: TagSet,

    /// Record schemas per record kind
    pub schemas: Schemas,
}

impl ParserConfig {
    /// Load parser configuration from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid YAML or fails
    /// [`ParserConfig::validate`].
    ///
    /// # Example
    /// ```ignore
    /// use edifact_inbound::ParserConfig;
    ///
    /// let config = ParserConfig::load_from_file("config/registration.yaml")?;
    /// println!("Mode: {:?}", config.mode);
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration with a different trailer policy.
    pub fn with_mode(mode: ParseMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Check tags and schemas.
    ///
    /// The four delimiters must be distinct. Tags must be three upper-case
    /// letters or digits and unique across roles.
    /// Field names must be snake_case and unique within a schema, paths must
    /// point past the tag element, and date formats must not be empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tag_pattern = Regex::new(r"^[A-Z0-9]{3}$").expect("static tag pattern");
        let name_pattern = Regex::new(r"^[a-z][a-z0-9_]*$").expect("static name pattern");

        let delimiters = [
            ("component", self.delimiters.component),
            ("element", self.delimiters.element),
            ("release", self.delimiters.release),
            ("terminator", self.delimiters.terminator),
        ];
        for (i, (first, delimiter)) in delimiters.iter().enumerate() {
            if let Some((second, _)) = delimiters[i + 1..].iter().find(|(_, d)| d == delimiter) {
                return Err(ConfigError::DuplicateDelimiter {
                    first: first.to_string(),
                    second: second.to_string(),
                    delimiter: *delimiter,
                });
            }
        }

        let mut seen_tags = HashSet::new();
        for (role, tag) in self.tags.entries() {
            if !tag_pattern.is_match(tag) {
                return Err(ConfigError::InvalidTag {
                    role: format!("{:?}", role),
                    tag: tag.to_string(),
                });
            }
            if !seen_tags.insert(tag) {
                return Err(ConfigError::DuplicateTag(tag.to_string()));
            }
        }

        for kind in RecordKind::ALL {
            let mut seen_names = HashSet::new();

            for spec in self.schemas.get(kind) {
                if !name_pattern.is_match(&spec.name) {
                    return Err(ConfigError::InvalidFieldName {
                        kind,
                        name: spec.name.clone(),
                    });
                }
                if !seen_names.insert(spec.name.as_str()) {
                    return Err(ConfigError::DuplicateField {
                        kind,
                        name: spec.name.clone(),
                    });
                }

                if !tag_pattern.is_match(&spec.path.segment) {
                    return Err(ConfigError::InvalidFieldPath {
                        kind,
                        field: spec.name.clone(),
                        reason: format!("'{}' is not a segment tag", spec.path.segment),
                    });
                }
                if spec.path.element == 0 {
                    return Err(ConfigError::InvalidFieldPath {
                        kind,
                        field: spec.name.clone(),
                        reason: "element 0 is the segment tag".to_string(),
                    });
                }

                if let FieldType::Date { format } | FieldType::DateTime { format } = &spec.field_type {
                    if format.trim().is_empty() {
                        return Err(ConfigError::EmptyFormat {
                            kind,
                            field: spec.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ParserConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.mode, ParseMode::Lenient);
        assert_eq!(config.tags.registration, "S01");
    }

    #[test]
    fn test_role_lookup() {
        let tags = TagSet::default();

        assert_eq!(tags.role_of("UNB"), Some(SegmentRole::InterchangeHeader));
        assert_eq!(tags.role_of("S02"), Some(SegmentRole::Patient));
        assert_eq!(tags.role_of("unb"), None);
        assert_eq!(tags.role_of("RFF"), None);
        assert_eq!(tags.tag_for(SegmentRole::MessageTrailer), "UNT");
        assert_eq!(SegmentRole::MessageHeader.record_kind(), None);
    }

    #[test]
    fn test_from_yaml_overrides_sections() {
        let config = ParserConfig::from_yaml_str(
            r#"
mode: strict
tags:
  patient: S03
"#,
        )
        .unwrap();

        assert_eq!(config.mode, ParseMode::Strict);
        assert_eq!(config.tags.patient, "S03");
        assert_eq!(config.tags.registration, "S01");
        assert_eq!(config.schemas, Schemas::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ParserConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_rejects_unknown_section() {
        let result = ParserConfig::from_yaml_str("moed: strict\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_rejects_invalid_tag() {
        let result = ParserConfig::from_yaml_str("tags:\n  registration: s01\n");
        assert!(matches!(result, Err(ConfigError::InvalidTag { .. })));
    }

    #[test]
    fn test_rejects_duplicate_tag() {
        let result = ParserConfig::from_yaml_str("tags:\n  patient: S01\n");
        assert!(matches!(result, Err(ConfigError::DuplicateTag(tag)) if tag == "S01"));
    }

    #[test]
    fn test_rejects_shared_delimiter() {
        let result = ParserConfig::from_yaml_str("delimiters:\n  element: \":\"\n");

        match result {
            Err(ConfigError::DuplicateDelimiter { first, second, delimiter }) => {
                assert_eq!(first, "component");
                assert_eq!(second, "element");
                assert_eq!(delimiter, ':');
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_accepts_distinct_custom_delimiters() {
        let config = ParserConfig::from_yaml_str(
            "delimiters:\n  component: \"|\"\n  element: \"*\"\n  release: \"!\"\n  terminator: \"~\"\n",
        )
        .unwrap();

        assert_eq!(config.delimiters.element, '*');
    }

    #[test]
    fn test_rejects_duplicate_field() {
        let result = ParserConfig::from_yaml_str(
            r#"
schemas:
  patient:
    - name: surname
      path: "PNA[PAT]+5:1"
      type: string
    - name: surname
      path: "PNA[PAT]+6:1"
      type: string
"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateField { kind: RecordKind::Patient, .. })
        ));
    }

    #[test]
    fn test_rejects_tag_element_path() {
        let result = ParserConfig::from_yaml_str(
            r#"
schemas:
  registration:
    - name: tag
      path: "S01+0"
      type: string
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidFieldPath { .. })));
    }

    #[test]
    fn test_rejects_bad_field_name_and_format() {
        let bad_name = ParserConfig::from_yaml_str(
            r#"
schemas:
  registration:
    - name: TransactionNumber
      path: "RFF[TN]+1:1"
      type: integer
"#,
        );
        assert!(matches!(bad_name, Err(ConfigError::InvalidFieldName { .. })));

        let empty_format = ParserConfig::from_yaml_str(
            r#"
schemas:
  patient:
    - name: date_of_birth
      path: "DTM[329]+1:1"
      type: date
      format: ""
"#,
        );
        assert!(matches!(empty_format, Err(ConfigError::EmptyFormat { .. })));
    }
}
