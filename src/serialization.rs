//! Output writers for deserialised interchanges.
//!
//! An interchange is written either as one pretty-printed JSON document or
//! as NDJSON, one message per line wrapped in a [`MessageLine`] that carries
//! the interchange context the message would otherwise lose.

use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::model::{Interchange, Message};
use crate::record::Record;

/// Error type for serialization operations
#[derive(Debug)]
pub enum SerializationError {
    JsonError(serde_json::Error),
    IoError(std::io::Error),
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::JsonError(err)
    }
}

impl From<std::io::Error> for SerializationError {
    fn from(err: std::io::Error) -> Self {
        SerializationError::IoError(err)
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::JsonError(e) => write!(f, "JSON error: {}", e),
            SerializationError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SerializationError {}

/// How a parsed interchange is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The whole tree as one pretty-printed JSON document
    #[default]
    Json,
    /// One [`MessageLine`] per line
    Ndjson,
}

/// One NDJSON line: a message plus its position in the interchange.
#[derive(Debug, Serialize)]
pub struct MessageLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<&'a str>,

    /// Zero-based message position within the interchange
    pub sequence: usize,

    pub interchange_header: &'a Record,

    pub message: &'a Message,
}

/// NDJSON (Newline Delimited JSON) writer
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a single value as an NDJSON line
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<(), SerializationError> {
        let json = serde_json::to_string(value)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Write every message of `interchange`, in order.
    ///
    /// # Returns
    /// Number of lines written
    pub fn write_messages(
        &mut self,
        interchange: &Interchange,
        correlation_id: Option<&str>,
    ) -> Result<usize, SerializationError> {
        for (sequence, message) in interchange.messages().iter().enumerate() {
            self.write(&MessageLine {
                correlation_id,
                sequence,
                interchange_header: interchange.header(),
                message,
            })?;
        }
        Ok(interchange.messages().len())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write `interchange` to `writer` in the given format.
pub fn write_interchange<W: Write>(
    writer: W,
    interchange: &Interchange,
    format: OutputFormat,
    correlation_id: Option<&str>,
) -> Result<(), SerializationError> {
    match format {
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, interchange)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        OutputFormat::Ndjson => {
            let mut ndjson = NdjsonWriter::new(writer);
            ndjson.write_messages(interchange, correlation_id)?;
            ndjson.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transaction;
    use crate::record::{FieldValue, RecordKind};

    fn interchange() -> Interchange {
        let message = |reference: &str| {
            Message::new(
                Record::new(RecordKind::MessageBeginning)
                    .with_attribute("reference_number", FieldValue::String(reference.to_string())),
                vec![Transaction::new(Record::new(RecordKind::Registration), None)],
                Record::new(RecordKind::MessageTrailer),
                4,
            )
        };

        Interchange::new(
            Record::new(RecordKind::InterchangeHeader)
                .with_attribute("sender", FieldValue::String("TES5".to_string())),
            vec![message("G1"), message("G2")],
            Record::new(RecordKind::InterchangeTrailer),
        )
    }

    #[test]
    fn test_ndjson_writes_one_line_per_message() {
        let mut buf = Vec::new();
        let mut writer = NdjsonWriter::new(&mut buf);

        let written = writer.write_messages(&interchange(), Some("run-1")).unwrap();
        writer.flush().unwrap();

        assert_eq!(written, 2);
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["correlation_id"], "run-1");
        assert_eq!(lines[1]["interchange_header"]["attributes"]["sender"], "TES5");
        assert_eq!(lines[1]["message"]["beginning"]["attributes"]["reference_number"], "G2");
    }

    #[test]
    fn test_ndjson_omits_missing_correlation_id() {
        let mut buf = Vec::new();
        write_interchange(&mut buf, &interchange(), OutputFormat::Ndjson, None).unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(!output.contains("correlation_id"));
    }

    #[test]
    fn test_json_writes_whole_tree() {
        let mut buf = Vec::new();
        write_interchange(&mut buf, &interchange(), OutputFormat::Json, None).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][0]["segment_count"], 4);
        assert_eq!(json["messages"][0]["transactions"][0]["patient"], serde_json::Value::Null);
    }
}
