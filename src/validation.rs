//! Structural checks on a deserialised interchange.
//!
//! Trailer segments declare how much came before them. These checks compare
//! those declarations with what was actually deserialised. They never fail:
//! every mismatch becomes a [`StructuralFault`] in the report.

use std::fmt;

use serde::Serialize;

use crate::model::Interchange;
use crate::record::Record;

/// Attribute of the interchange trailer holding the declared message count.
pub const MESSAGE_COUNT: &str = "message_count";

/// Attribute of a message trailer holding the declared segment count.
pub const SEGMENT_COUNT: &str = "segment_count";

/// One disagreement between a trailer and the content it closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "fault", rename_all = "snake_case")]
pub enum StructuralFault {
    MessageCountMismatch { declared: i64, actual: usize },
    SegmentCountMismatch { message: usize, declared: i64, actual: usize },
}

impl fmt::Display for StructuralFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralFault::MessageCountMismatch { declared, actual } => write!(
                f,
                "Interchange trailer declares {} messages, found {}",
                declared, actual
            ),
            StructuralFault::SegmentCountMismatch { message, declared, actual } => write!(
                f,
                "Message {} trailer declares {} segments, found {}",
                message, declared, actual
            ),
        }
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    faults: Vec<StructuralFault>,
}

impl ValidationReport {
    pub fn faults(&self) -> &[StructuralFault] {
        &self.faults
    }

    pub fn is_valid(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Compare trailer counts with the deserialised tree.
///
/// Counts are only checked where the trailer record carries an integer
/// attribute; absent or null attributes are skipped.
pub fn validate(interchange: &Interchange) -> ValidationReport {
    let mut faults = Vec::new();

    if let Some(declared) = declared_count(interchange.trailer(), MESSAGE_COUNT) {
        let actual = interchange.messages().len();
        if declared != actual as i64 {
            faults.push(StructuralFault::MessageCountMismatch { declared, actual });
        }
    }

    for (index, message) in interchange.messages().iter().enumerate() {
        if let Some(declared) = declared_count(message.trailer(), SEGMENT_COUNT) {
            let actual = message.segment_count();
            if declared != actual as i64 {
                faults.push(StructuralFault::SegmentCountMismatch {
                    message: index,
                    declared,
                    actual,
                });
            }
        }
    }

    for fault in &faults {
        tracing::warn!("Structural fault: {}", fault);
    }

    ValidationReport { faults }
}

fn declared_count(record: &Record, name: &str) -> Option<i64> {
    record.get_int(name)
}
