//! Hierarchical deserialiser.
//!
//! One forward pass over the line sequence, driven by an explicit state
//! machine. Segment groups are carved out with [`extract`] at the points the
//! tags dictate and handed to a [`RecordCreator`]:
//!
//! ```text
//! AwaitingHeader --UNB--> InInterchange --UNH/BGM--> InMessage --S01--> InTransaction
//!                              ^   |                     |                  |  ^
//!                              |   +--UNZ--> Closed      |                  +--+ S01/S02
//!                              +------------UNT----------+------------------+
//! ```
//!
//! Tags outside the vocabulary are ignored in every state.

use std::fmt;

use crate::extraction::{extract, SegmentGroup};
use crate::model::{Interchange, Message, Transaction};
use crate::record::{Record, RecordError, RecordKind};
use crate::runtime::config_loader::{ParseMode, ParserConfig, SegmentRole};
use crate::runtime::creators::{RecordCreator, SchemaCreator};
use crate::segment::{lines_from_raw, segments_from_text, Line};

/// Error type for deserialisation
///
/// Positions are zero-based: raw line numbers for [`Deserialiser::convert`],
/// segment numbers for [`Deserialiser::convert_text`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeserialiseError {
    /// A recognised segment arrived in a state that cannot accept it
    UnexpectedSegment {
        tag: String,
        index: usize,
        state: &'static str,
    },
    /// A message trailer closed a message that never had a beginning segment
    MissingMessageBeginning { index: usize },
    /// A message opened at `start` was still open at `index` (strict mode)
    UnterminatedMessage { start: usize, index: usize },
    /// A recognised segment followed the interchange trailer (strict mode)
    SegmentAfterTrailer { tag: String, index: usize },
    /// Input ended before any interchange header (strict mode)
    MissingInterchangeHeader,
    /// Input ended before the interchange trailer (strict mode)
    MissingInterchangeTrailer,
    /// The record creator rejected the group starting at `index`
    Record { index: usize, source: RecordError },
}

impl fmt::Display for DeserialiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserialiseError::UnexpectedSegment { tag, index, state } => {
                write!(f, "Unexpected segment '{}' at line {} while {}", tag, index, state)
            }
            DeserialiseError::MissingMessageBeginning { index } => {
                write!(f, "Message trailer at line {} closes a message without a beginning segment", index)
            }
            DeserialiseError::UnterminatedMessage { start, index } => {
                write!(f, "Message starting at line {} is not terminated before line {}", start, index)
            }
            DeserialiseError::SegmentAfterTrailer { tag, index } => {
                write!(f, "Segment '{}' at line {} follows the interchange trailer", tag, index)
            }
            DeserialiseError::MissingInterchangeHeader => write!(f, "Input has no interchange header"),
            DeserialiseError::MissingInterchangeTrailer => {
                write!(f, "Interchange is not terminated by a trailer segment")
            }
            DeserialiseError::Record { index, source } => {
                write!(f, "Failed to create record at line {}: {}", index, source)
            }
        }
    }
}

impl std::error::Error for DeserialiseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeserialiseError::Record { source, .. } => Some(source),
            _ => None,
        }
    }
}

struct OpenInterchange {
    header: Record,
    messages: Vec<Message>,
}

struct OpenMessage {
    /// Index of the segment that opened the message
    start: usize,
    beginning: Option<Record>,
    transactions: Vec<Transaction>,
}

impl OpenMessage {
    fn new(start: usize, beginning: Option<Record>) -> Self {
        Self {
            start,
            beginning,
            transactions: Vec::new(),
        }
    }
}

/// Scan state. Lines between a registration segment and the next
/// registration or message trailer belong to `InTransaction`.
enum Phase {
    AwaitingHeader,
    InInterchange(OpenInterchange),
    InMessage(OpenInterchange, OpenMessage),
    InTransaction(OpenInterchange, OpenMessage),
    Closed(Interchange),
}

impl Phase {
    fn describe(&self) -> &'static str {
        match self {
            Phase::AwaitingHeader => "awaiting the interchange header",
            Phase::InInterchange(_) => "between messages",
            Phase::InMessage(..) => "in a message before any transaction",
            Phase::InTransaction(..) => "in a transaction",
            Phase::Closed(_) => "after the interchange trailer",
        }
    }
}

/// Deserialiser for one interchange per call.
///
/// Holds no state between calls; one instance can be shared across threads.
///
/// # Example
/// ```
/// use edifact_inbound::Deserialiser;
///
/// let lines = ["UNB+UNOA:2+TES5+XX11", "BGM+++507", "S01+1", "RFF+TN:17", "UNT+4+1", "UNZ+1+2"];
/// let interchange = Deserialiser::default().convert(&lines).unwrap().unwrap();
///
/// assert_eq!(interchange.messages().len(), 1);
/// assert_eq!(interchange.messages()[0].transactions().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Deserialiser<C = SchemaCreator> {
    config: ParserConfig,
    creator: C,
}

impl Default for Deserialiser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Deserialiser {
    /// Create a deserialiser whose records follow the configured schemas.
    pub fn new(config: ParserConfig) -> Self {
        let creator = SchemaCreator::new(config.schemas.clone());
        Self { config, creator }
    }
}

impl<C: RecordCreator> Deserialiser<C> {
    /// Create a deserialiser with a custom record creator.
    ///
    /// The configured schemas are ignored; tags, delimiters and mode still apply.
    pub fn with_creator(config: ParserConfig, creator: C) -> Self {
        Self { config, creator }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Deserialise raw text lines, one segment per line.
    ///
    /// Blank lines are skipped but still count towards error positions, and a
    /// leading `UNA` line overrides the configured delimiters.
    ///
    /// # Returns
    /// * `Ok(Some(interchange))` - The interchange trailer was reached
    /// * `Ok(None)` - Lenient mode only: the input never closed an interchange
    /// * `Err(err)` - Illegal segment order, a rejected record, or (strict mode)
    ///   an unterminated structure
    pub fn convert<S: AsRef<str>>(&self, lines: &[S]) -> Result<Option<Interchange>, DeserialiseError> {
        let lines = lines_from_raw(lines, &self.config.delimiters);
        self.convert_lines(&lines)
    }

    /// Deserialise a whole interchange text, segments split on the terminator.
    pub fn convert_text(&self, text: &str) -> Result<Option<Interchange>, DeserialiseError> {
        let (_, lines) = segments_from_text(text, &self.config.delimiters);
        self.convert_lines(&lines)
    }

    /// Deserialise an already tokenized line sequence.
    pub fn convert_lines(&self, lines: &[Line]) -> Result<Option<Interchange>, DeserialiseError> {
        let mut phase = Phase::AwaitingHeader;

        for (index, line) in lines.iter().enumerate() {
            let role = match self.config.tags.role_of(line.tag()) {
                Some(role) => role,
                None => {
                    tracing::trace!("Ignoring segment '{}' at line {}", line.tag(), index);
                    continue;
                }
            };

            phase = self.step(phase, lines, index, role)?;
        }

        self.finish(phase)
    }

    fn step(
        &self,
        phase: Phase,
        lines: &[Line],
        index: usize,
        role: SegmentRole,
    ) -> Result<Phase, DeserialiseError> {
        let next = match (phase, role) {
            (Phase::AwaitingHeader, SegmentRole::InterchangeHeader) => {
                Phase::InInterchange(OpenInterchange {
                    header: self.interchange_header(lines, index)?,
                    messages: Vec::new(),
                })
            }
            (Phase::InInterchange(mut open), SegmentRole::InterchangeHeader) => {
                tracing::debug!("Repeated interchange header at line {} replaces the earlier one", index);
                open.header = self.interchange_header(lines, index)?;
                Phase::InInterchange(open)
            }

            (Phase::InInterchange(open), SegmentRole::MessageHeader) => {
                Phase::InMessage(open, OpenMessage::new(index, None))
            }
            (Phase::InInterchange(open), SegmentRole::MessageBeginning) => {
                let beginning = self.message_beginning(lines, index)?;
                Phase::InMessage(open, OpenMessage::new(index, Some(beginning)))
            }
            (Phase::InMessage(open, mut message), SegmentRole::MessageBeginning) => {
                if message.beginning.is_some() {
                    tracing::debug!("Repeated message beginning at line {} replaces the earlier one", index);
                }
                message.beginning = Some(self.message_beginning(lines, index)?);
                Phase::InMessage(open, message)
            }
            (
                Phase::InMessage(open, message) | Phase::InTransaction(open, message),
                SegmentRole::MessageHeader,
            ) => {
                self.unterminated_message(&message, index)?;
                Phase::InMessage(open, OpenMessage::new(index, None))
            }

            (
                Phase::InMessage(open, mut message) | Phase::InTransaction(open, mut message),
                SegmentRole::Registration,
            ) => {
                message.transactions.push(self.transaction(lines, index)?);
                Phase::InTransaction(open, message)
            }
            // already consumed by the registration that opened the transaction
            (Phase::InTransaction(open, message), SegmentRole::Patient) => {
                Phase::InTransaction(open, message)
            }

            (
                Phase::InMessage(mut open, message) | Phase::InTransaction(mut open, message),
                SegmentRole::MessageTrailer,
            ) => {
                open.messages.push(self.close_message(message, lines, index)?);
                Phase::InInterchange(open)
            }

            (Phase::InInterchange(open), SegmentRole::InterchangeTrailer) => {
                Phase::Closed(self.close_interchange(open, lines, index)?)
            }
            (
                Phase::InMessage(open, message) | Phase::InTransaction(open, message),
                SegmentRole::InterchangeTrailer,
            ) => {
                self.unterminated_message(&message, index)?;
                Phase::Closed(self.close_interchange(open, lines, index)?)
            }

            (Phase::Closed(interchange), _) => {
                let tag = self.config.tags.tag_for(role).to_string();
                if self.config.mode == ParseMode::Strict {
                    return Err(DeserialiseError::SegmentAfterTrailer { tag, index });
                }
                tracing::warn!("Ignoring segment '{}' at line {} after the interchange trailer", tag, index);
                Phase::Closed(interchange)
            }

            (phase, _) => {
                return Err(DeserialiseError::UnexpectedSegment {
                    tag: self.config.tags.tag_for(role).to_string(),
                    index,
                    state: phase.describe(),
                })
            }
        };

        Ok(next)
    }

    fn finish(&self, phase: Phase) -> Result<Option<Interchange>, DeserialiseError> {
        match (phase, self.config.mode) {
            (Phase::Closed(interchange), _) => {
                tracing::info!(
                    "Deserialised interchange with {} messages and {} transactions",
                    interchange.messages().len(),
                    interchange.transaction_count()
                );
                Ok(Some(interchange))
            }
            (Phase::AwaitingHeader, ParseMode::Strict) => Err(DeserialiseError::MissingInterchangeHeader),
            (_, ParseMode::Strict) => Err(DeserialiseError::MissingInterchangeTrailer),
            (phase, ParseMode::Lenient) => {
                tracing::warn!(
                    "Input ended {} without an interchange trailer; no interchange produced",
                    phase.describe()
                );
                Ok(None)
            }
        }
    }

    /// Strict mode rejects a message that is still open; lenient mode drops it.
    fn unterminated_message(&self, message: &OpenMessage, index: usize) -> Result<(), DeserialiseError> {
        if self.config.mode == ParseMode::Strict {
            return Err(DeserialiseError::UnterminatedMessage {
                start: message.start,
                index,
            });
        }

        tracing::warn!(
            "Dropping message started at line {} with {} transactions: no trailer before line {}",
            message.start,
            message.transactions.len(),
            index
        );
        Ok(())
    }

    fn interchange_header(&self, lines: &[Line], index: usize) -> Result<Record, DeserialiseError> {
        let tags = &self.config.tags;
        let group = extract(
            lines,
            index,
            &[tags.message_header.as_str(), tags.message_beginning.as_str()],
        );
        self.create(RecordKind::InterchangeHeader, &group)
    }

    fn message_beginning(&self, lines: &[Line], index: usize) -> Result<Record, DeserialiseError> {
        let tags = &self.config.tags;
        let group = extract(
            lines,
            index,
            &[tags.registration.as_str(), tags.message_trailer.as_str()],
        );
        self.create(RecordKind::MessageBeginning, &group)
    }

    /// Build the transaction opened by the registration segment at `index`.
    ///
    /// The registration and patient groups are two independent extractions
    /// from `lines`; the patient group starts right after the registration
    /// group and exists only if that is still inside the transaction group.
    fn transaction(&self, lines: &[Line], index: usize) -> Result<Transaction, DeserialiseError> {
        let tags = &self.config.tags;
        let body_start = index + 1;

        let transaction_group = extract(
            lines,
            body_start,
            &[tags.registration.as_str(), tags.message_trailer.as_str()],
        );
        let registration_group = extract(
            lines,
            body_start,
            &[
                tags.registration.as_str(),
                tags.patient.as_str(),
                tags.message_trailer.as_str(),
            ],
        );
        let registration = self.create(RecordKind::Registration, &registration_group)?;

        let patient_start = body_start + registration_group.len();
        let patient = if patient_start < transaction_group.end() {
            let patient_group = extract(
                lines,
                patient_start,
                &[tags.registration.as_str(), tags.message_trailer.as_str()],
            );
            Some(self.create(RecordKind::Patient, &patient_group)?)
        } else {
            None
        };

        tracing::debug!(
            "Transaction at line {} spans {} lines, patient {}",
            index,
            transaction_group.len(),
            if patient.is_some() { "present" } else { "absent" }
        );

        Ok(Transaction::new(registration, patient))
    }

    fn close_message(
        &self,
        message: OpenMessage,
        lines: &[Line],
        index: usize,
    ) -> Result<Message, DeserialiseError> {
        let beginning = message
            .beginning
            .ok_or(DeserialiseError::MissingMessageBeginning { index })?;

        let boundary = self.boundary_except(SegmentRole::MessageTrailer);
        let trailer = self.create(RecordKind::MessageTrailer, &extract(lines, index, &boundary))?;

        tracing::debug!(
            "Message at lines {}..={} closed with {} transactions",
            message.start,
            index,
            message.transactions.len()
        );

        // blank raw lines keep their position but are not segments
        let segment_count = lines[message.start..=index]
            .iter()
            .filter(|line| !line.is_empty())
            .count();

        Ok(Message::new(beginning, message.transactions, trailer, segment_count))
    }

    fn close_interchange(
        &self,
        open: OpenInterchange,
        lines: &[Line],
        index: usize,
    ) -> Result<Interchange, DeserialiseError> {
        let boundary = self.boundary_except(SegmentRole::InterchangeTrailer);
        let trailer = self.create(RecordKind::InterchangeTrailer, &extract(lines, index, &boundary))?;

        Ok(Interchange::new(open.header, open.messages, trailer))
    }

    /// Every vocabulary tag except the one for `role`, so a group started on
    /// that segment ends at the next structural segment.
    fn boundary_except(&self, role: SegmentRole) -> Vec<&str> {
        self.config
            .tags
            .entries()
            .into_iter()
            .filter(|(r, _)| *r != role)
            .map(|(_, tag)| tag)
            .collect()
    }

    fn create(&self, kind: RecordKind, group: &SegmentGroup<'_>) -> Result<Record, DeserialiseError> {
        self.creator
            .create(kind, group)
            .map_err(|source| DeserialiseError::Record {
                index: group.start(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    /// Records where each group came from instead of reading fields.
    struct SpanCreator;

    impl RecordCreator for SpanCreator {
        fn create(&self, kind: RecordKind, group: &SegmentGroup<'_>) -> Result<Record, RecordError> {
            Ok(Record::new(kind)
                .with_attribute("start", FieldValue::Int(group.start() as i64))
                .with_attribute("len", FieldValue::Int(group.len() as i64)))
        }
    }

    /// Rejects every patient record.
    struct RejectingCreator;

    impl RecordCreator for RejectingCreator {
        fn create(&self, kind: RecordKind, _group: &SegmentGroup<'_>) -> Result<Record, RecordError> {
            if kind == RecordKind::Patient {
                return Err(RecordError::RequiredFieldMissing {
                    kind,
                    field: "nhs_number".to_string(),
                });
            }
            Ok(Record::new(kind))
        }
    }

    fn span(record: &Record) -> (i64, i64) {
        (
            record.get_int("start").unwrap(),
            record.get_int("len").unwrap(),
        )
    }

    fn spans(mode: ParseMode) -> Deserialiser<SpanCreator> {
        Deserialiser::with_creator(ParserConfig::with_mode(mode), SpanCreator)
    }

    #[test]
    fn test_transaction_groups_use_explicit_offsets() {
        let lines = [
            "UNB+A+B",          // 0
            "UNH+1",            // 1
            "BGM+++507",        // 2
            "NAD+FHS+XX1:954",  // 3
            "S01+1",            // 4
            "RFF+TN:17",        // 5
            "NAD+GP+1234",      // 6
            "S02+2",            // 7
            "PNA+PAT+N/10/10",  // 8
            "DTM+329:19911106", // 9
            "S01+1",            // 10
            "RFF+TN:18",        // 11
            "UNT+13+1",         // 12
            "UNZ+1+B",          // 13
        ];

        let interchange = spans(ParseMode::Strict).convert(&lines).unwrap().unwrap();
        let message = &interchange.messages()[0];

        // header runs up to the message header, beginning up to the first registration
        assert_eq!(span(interchange.header()), (0, 1));
        assert_eq!(span(message.beginning()), (2, 2));

        let first = &message.transactions()[0];
        assert_eq!(span(first.registration()), (5, 2));
        assert_eq!(span(first.patient().unwrap()), (7, 3));

        let second = &message.transactions()[1];
        assert_eq!(span(second.registration()), (11, 1));
        assert!(second.patient().is_none());

        assert_eq!(span(message.trailer()), (12, 1));
        assert_eq!(message.segment_count(), 12);
        assert_eq!(span(interchange.trailer()), (13, 1));
    }

    #[test]
    fn test_registration_as_last_line_yields_empty_group() {
        let lines = ["UNB", "BGM", "S01"];

        let result = spans(ParseMode::Lenient).convert(&lines).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_message_beginning_without_header_opens_message() {
        let lines = ["UNB", "BGM", "UNT", "UNZ"];

        let interchange = spans(ParseMode::Strict).convert(&lines).unwrap().unwrap();

        assert_eq!(interchange.messages().len(), 1);
        assert!(interchange.messages()[0].transactions().is_empty());
        assert_eq!(interchange.messages()[0].segment_count(), 2);
    }

    #[test]
    fn test_repeated_beginning_last_seen_wins() {
        let lines = ["UNB", "UNH", "BGM+++1", "BGM+++2", "S01", "UNT", "UNZ"];

        let interchange = spans(ParseMode::Strict).convert(&lines).unwrap().unwrap();

        assert_eq!(span(interchange.messages()[0].beginning()), (3, 1));
    }

    #[test]
    fn test_registration_outside_message_is_rejected() {
        let lines = ["UNB", "S01", "UNZ"];

        let err = spans(ParseMode::Lenient).convert(&lines).unwrap_err();

        assert_eq!(
            err,
            DeserialiseError::UnexpectedSegment {
                tag: "S01".to_string(),
                index: 1,
                state: "between messages",
            }
        );
    }

    #[test]
    fn test_patient_outside_transaction_is_rejected() {
        let lines = ["UNB", "BGM", "S02", "S01", "UNT", "UNZ"];

        let err = spans(ParseMode::Lenient).convert(&lines).unwrap_err();

        assert!(matches!(err, DeserialiseError::UnexpectedSegment { index: 2, .. }));
    }

    #[test]
    fn test_segment_before_header_is_rejected() {
        let lines = ["BGM", "UNB", "UNZ"];

        let err = spans(ParseMode::Lenient).convert(&lines).unwrap_err();

        assert!(matches!(
            err,
            DeserialiseError::UnexpectedSegment { index: 0, state: "awaiting the interchange header", .. }
        ));
    }

    #[test]
    fn test_trailer_without_beginning_is_rejected() {
        let lines = ["UNB", "UNH", "S01", "UNT", "UNZ"];

        let err = spans(ParseMode::Lenient).convert(&lines).unwrap_err();

        assert_eq!(err, DeserialiseError::MissingMessageBeginning { index: 3 });
    }

    #[test]
    fn test_unterminated_message_dropped_when_lenient() {
        let lines = ["UNB", "BGM", "S01", "UNT", "UNH", "BGM", "S01", "UNZ"];

        let interchange = spans(ParseMode::Lenient).convert(&lines).unwrap().unwrap();

        assert_eq!(interchange.messages().len(), 1);
    }

    #[test]
    fn test_unterminated_message_rejected_when_strict() {
        let lines = ["UNB", "BGM", "S01", "UNT", "UNH", "BGM", "S01", "UNZ"];

        let err = spans(ParseMode::Strict).convert(&lines).unwrap_err();

        assert_eq!(err, DeserialiseError::UnterminatedMessage { start: 4, index: 7 });
    }

    #[test]
    fn test_new_message_header_inside_open_message() {
        let lines = ["UNB", "UNH", "BGM", "S01", "UNH", "BGM", "S01", "UNT", "UNZ"];

        let lenient = spans(ParseMode::Lenient).convert(&lines).unwrap().unwrap();
        assert_eq!(lenient.messages().len(), 1);
        assert_eq!(span(lenient.messages()[0].beginning()), (5, 1));

        let strict = spans(ParseMode::Strict).convert(&lines).unwrap_err();
        assert_eq!(strict, DeserialiseError::UnterminatedMessage { start: 1, index: 4 });
    }

    #[test]
    fn test_segments_after_trailer() {
        let lines = ["UNB", "UNZ", "UNB"];

        let lenient = spans(ParseMode::Lenient).convert(&lines).unwrap();
        assert!(lenient.is_some());

        let strict = spans(ParseMode::Strict).convert(&lines).unwrap_err();
        assert_eq!(
            strict,
            DeserialiseError::SegmentAfterTrailer {
                tag: "UNB".to_string(),
                index: 2
            }
        );
    }

    #[test]
    fn test_empty_input() {
        let lines: [&str; 0] = [];

        assert_eq!(spans(ParseMode::Lenient).convert(&lines).unwrap(), None);
        assert_eq!(
            spans(ParseMode::Strict).convert(&lines).unwrap_err(),
            DeserialiseError::MissingInterchangeHeader
        );
    }

    #[test]
    fn test_creator_error_carries_group_start() {
        let lines = ["UNB", "BGM", "S01", "RFF+TN:1", "S02", "PNA+PAT", "UNT", "UNZ"];
        let deserialiser = Deserialiser::with_creator(ParserConfig::default(), RejectingCreator);

        let err = deserialiser.convert(&lines).unwrap_err();

        match err {
            DeserialiseError::Record { index, source } => {
                assert_eq!(index, 4);
                assert_eq!(
                    source,
                    RecordError::RequiredFieldMissing {
                        kind: RecordKind::Patient,
                        field: "nhs_number".to_string(),
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_positions_count_blank_lines() {
        let lines = ["UNB+A+B", "", "   ", "S01+1", "UNZ+1+B"];

        let err = spans(ParseMode::Lenient).convert(&lines).unwrap_err();

        assert_eq!(
            err,
            DeserialiseError::UnexpectedSegment {
                tag: "S01".to_string(),
                index: 3,
                state: "between messages",
            }
        );
    }

    #[test]
    fn test_blank_lines_are_not_counted_as_segments() {
        let lines = ["UNB", "UNH", "", "BGM", "S01", "", "RFF+TN:1", "UNT", "UNZ"];

        let interchange = spans(ParseMode::Strict).convert(&lines).unwrap().unwrap();
        let message = &interchange.messages()[0];

        assert_eq!(message.segment_count(), 5);
        assert_eq!(span(message.beginning()), (3, 1));
        assert_eq!(span(message.transactions()[0].registration()), (5, 2));
    }

    #[test]
    fn test_convert_text_splits_on_terminator() {
        let text = "UNB+A+B'UNH+1'BGM+++507'S01+1'S02+2'UNT+5+1'UNZ+1+B'";

        let interchange = spans(ParseMode::Strict).convert_text(text).unwrap().unwrap();

        let transaction = &interchange.messages()[0].transactions()[0];
        assert!(transaction.patient().is_some());
    }
}
