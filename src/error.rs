//! Error types for the fake update API.
//!
//! Two severities exist. [`FakeApiError`] is returned for failures of the
//! harness itself (binding the listener, reading scenario files). Everything
//! a client under test can cause is a [`RecordedError`]: it is collected into
//! the run's error list and never aborts the run.

use thiserror::Error;

use crate::models::EventKind;

/// Errors produced when decoding an inbound payload into an event.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The kind is not one of the known update event kinds.
    #[error("unexpected output type: {0}")]
    UnknownKind(String),

    /// The payload did not match the schema for its kind.
    #[error("failed to decode {kind}: {source}")]
    Malformed {
        kind: EventKind,
        #[source]
        source: serde_yaml::Error,
    },
}

/// The comparator's verdict when an expected and an actual event differ.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} was unexpected{}", .kind.description(), path_suffix(.path))]
pub struct MismatchError {
    /// Variant both events share.
    pub kind: EventKind,
    /// Path of the first differing field, e.g. `dependencies[0].version`.
    pub path: Option<String>,
}

fn path_suffix(path: &Option<String>) -> String {
    match path {
        Some(p) if p.is_empty() => String::new(),
        Some(p) => format!(" (first difference at {p})"),
        None => String::new(),
    }
}

/// A failure recorded in the error list of a run.
///
/// The display form of every variant is a single line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordedError {
    /// The request body could not be read.
    #[error("failed to read body: {0}")]
    ReadBody(String),

    /// The payload could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// A call arrived after every expectation was consumed.
    #[error("missing expectation for {kind}")]
    MissingExpectation { kind: String },

    /// The call's kind differs from the expected kind at the cursor.
    #[error("type was unexpected: expected {expected} got {actual}")]
    KindMismatch { expected: EventKind, actual: String },

    /// The call's payload differs from the expected payload.
    #[error(transparent)]
    Mismatch(#[from] MismatchError),

    /// An expectation was never consumed by the end of the run.
    #[error("expectation not met: {kind} {expected}")]
    ExpectationNotMet {
        kind: EventKind,
        expected: serde_json::Value,
    },
}

impl RecordedError {
    /// Build a body read failure, stripped to a single line.
    pub fn read_body(message: impl std::fmt::Display) -> Self {
        Self::ReadBody(single_line(&message.to_string()))
    }
}

impl From<DecodeError> for RecordedError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(single_line(&err.to_string()))
    }
}

/// Strip carriage returns and newlines so a message fits on one log line.
pub(crate) fn single_line(message: &str) -> String {
    message.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Errors that stop the harness itself.
#[derive(Debug, Error)]
pub enum FakeApiError {
    /// The listener could not be bound.
    #[error("failed to bind fake API listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A scenario document could not be parsed or written.
    #[error("invalid scenario: {0}")]
    Scenario(#[from] serde_yaml::Error),

    /// A report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fake API operations.
pub type Result<T> = core::result::Result<T, FakeApiError>;
