//! Deserialised interchange tree.
//!
//! Ownership is strictly downward: an [`Interchange`] owns its [`Message`]s,
//! which own their [`Transaction`]s, which own their records. Every node is
//! built once by the deserialiser and read-only afterwards.

use serde::Serialize;

use crate::record::Record;

/// One registration transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    registration: Record,
    patient: Option<Record>,
}

impl Transaction {
    pub fn new(registration: Record, patient: Option<Record>) -> Self {
        Self {
            registration,
            patient,
        }
    }

    pub fn registration(&self) -> &Record {
        &self.registration
    }

    /// Patient details; present only when the transaction carried a patient segment.
    pub fn patient(&self) -> Option<&Record> {
        self.patient.as_ref()
    }
}

/// One message of an interchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    beginning: Record,
    transactions: Vec<Transaction>,
    trailer: Record,
    segment_count: usize,
}

impl Message {
    pub fn new(
        beginning: Record,
        transactions: Vec<Transaction>,
        trailer: Record,
        segment_count: usize,
    ) -> Self {
        Self {
            beginning,
            transactions,
            trailer,
            segment_count,
        }
    }

    pub fn beginning(&self) -> &Record {
        &self.beginning
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn trailer(&self) -> &Record {
        &self.trailer
    }

    /// Segments from the message's first segment to its trailer, inclusive.
    /// Blank input lines inside that span are not counted.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }
}

/// Top-level envelope of one parsed input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interchange {
    header: Record,
    messages: Vec<Message>,
    trailer: Record,
}

impl Interchange {
    pub fn new(header: Record, messages: Vec<Message>, trailer: Record) -> Self {
        Self {
            header,
            messages,
            trailer,
        }
    }

    pub fn header(&self) -> &Record {
        &self.header
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn trailer(&self) -> &Record {
        &self.trailer
    }

    /// Total transactions across all messages.
    pub fn transaction_count(&self) -> usize {
        self.messages.iter().map(|m| m.transactions().len()).sum()
    }
}
