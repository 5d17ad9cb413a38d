//! Configuration loading tests

use std::io::Write;
use std::path::PathBuf;

use edifact_inbound::{ConfigError, DeserialiseError, Deserialiser, ParseMode, ParserConfig, RecordError};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_bundled_registration_config_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/registration.yaml");

    let config = ParserConfig::load_from_file(&path).unwrap();

    assert_eq!(config.mode, ParseMode::Lenient);
    assert_eq!(config.tags, ParserConfig::default().tags);
    assert_eq!(config.delimiters, ParserConfig::default().delimiters);
    assert!(config.schemas.registration[0].required);
}

#[test]
fn test_custom_tags_and_schema() {
    let file = write_config(
        r#"
mode: strict
tags:
  registration: R01
  patient: R02
schemas:
  registration:
    - name: ref
      path: "RFF+1:1"
      type: string
  patient:
    - name: born
      path: "DTM[329]+1:1"
      type: date
      format: "%d%m%Y"
"#,
    );

    let config = ParserConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.mode, ParseMode::Strict);

    let lines = ["UNB", "BGM", "R01", "RFF+TN:17", "R02", "DTM+329:06111991", "UNT", "UNZ"];
    let interchange = Deserialiser::new(config).convert(&lines).unwrap().unwrap();

    let transaction = &interchange.messages()[0].transactions()[0];
    assert_eq!(transaction.registration().get_str("ref"), Some("17"));
    assert_eq!(transaction.registration().len(), 1);
    assert_eq!(
        transaction
            .patient()
            .and_then(|p| p.get("born"))
            .and_then(|v| v.as_date())
            .map(|d| d.to_string()),
        Some("1991-11-06".to_string())
    );
}

#[test]
fn test_required_field_missing_fails_deserialisation() {
    let file = write_config(
        r#"
schemas:
  patient:
    - name: nhs_number
      path: "PNA[PAT]+2:0"
      type: string
      required: true
"#,
    );
    let config = ParserConfig::load_from_file(file.path()).unwrap();

    let lines = ["UNB", "BGM", "S01", "S02", "PNA+PAT+", "UNT", "UNZ"];
    let err = Deserialiser::new(config).convert(&lines).unwrap_err();

    assert!(matches!(
        err,
        DeserialiseError::Record {
            index: 3,
            source: RecordError::RequiredFieldMissing { .. }
        }
    ));
}

#[test]
fn test_missing_file_reports_path() {
    let err = ParserConfig::load_from_file("does/not/exist.yaml").unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("does/not/exist.yaml"));
}

#[test]
fn test_invalid_schema_is_rejected_on_load() {
    let file = write_config(
        r#"
schemas:
  registration:
    - name: TransactionNumber
      path: "RFF[TN]+1:1"
      type: integer
"#,
    );

    let err = ParserConfig::load_from_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidFieldName { .. }));
}

#[test]
fn test_malformed_path_is_a_yaml_error() {
    let file = write_config(
        r#"
schemas:
  registration:
    - name: transaction_number
      path: "RFF[TN"
      type: integer
"#,
    );

    let err = ParserConfig::load_from_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Yaml(_)));
}
