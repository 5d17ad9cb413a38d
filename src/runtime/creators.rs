//! Record creators: segment group in, typed record out.

use chrono::{NaiveDate, NaiveDateTime};

use crate::extraction::{FieldSource, SegmentGroup};
use crate::record::{FieldValue, Record, RecordError, RecordKind};
use crate::runtime::schema::{FieldSpec, FieldType, Schemas};

/// Trait for building records from segment groups.
///
/// Implementations must be free of side effects: the deserialiser may call
/// them from any thread and in any order across independent inputs.
pub trait RecordCreator: Send + Sync {
    /// Create the record of `kind` from `group`.
    ///
    /// # Returns
    /// * `Ok(record)` - Record built, possibly with null attributes
    /// * `Err(err)` - A required value was missing or a value had the wrong type
    fn create(&self, kind: RecordKind, group: &SegmentGroup<'_>) -> Result<Record, RecordError>;
}

/// Record creator driven by declared [`Schemas`].
#[derive(Debug, Clone, Default)]
pub struct SchemaCreator {
    schemas: Schemas,
}

impl SchemaCreator {
    pub fn new(schemas: Schemas) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &Schemas {
        &self.schemas
    }
}

impl RecordCreator for SchemaCreator {
    fn create(&self, kind: RecordKind, group: &SegmentGroup<'_>) -> Result<Record, RecordError> {
        let mut record = Record::new(kind);

        for spec in self.schemas.get(kind) {
            let value = resolve_field(kind, spec, group)?;
            record = record.with_attribute(spec.name.clone(), value);
        }

        Ok(record)
    }
}

fn resolve_field(
    kind: RecordKind,
    spec: &FieldSpec,
    group: &SegmentGroup<'_>,
) -> Result<FieldValue, RecordError> {
    let raw = match group.locate(&spec.path).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw,
        None if spec.required => {
            return Err(RecordError::RequiredFieldMissing {
                kind,
                field: spec.name.clone(),
            })
        }
        None => return Ok(FieldValue::Null),
    };

    let invalid = |reason: String| RecordError::InvalidFieldValue {
        kind,
        field: spec.name.clone(),
        value: raw.clone(),
        reason,
    };

    match &spec.field_type {
        FieldType::String => Ok(FieldValue::String(raw.clone())),
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|e| invalid(e.to_string())),
        FieldType::Date { format } => NaiveDate::parse_from_str(raw.trim(), format)
            .map(FieldValue::Date)
            .map_err(|e| invalid(e.to_string())),
        FieldType::DateTime { format } => NaiveDateTime::parse_from_str(raw.trim(), format)
            .map(FieldValue::DateTime)
            .map_err(|e| invalid(e.to_string())),
    }
}
