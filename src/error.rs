//! Error types for runlog
//!
//! Every failure is a deterministic function of the input: malformed text,
//! a violated one-of invariant, or an out-of-range access. Nothing here is
//! retried or silently defaulted.

use crate::kind::ArtifactKind;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Runlog error types
#[derive(Error, Debug)]
pub enum Error {
    /// Timestamp text that no accepted ISO-8601 form can parse
    #[error("Received an invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// One-of invariant violated: no payload slot was set
    #[error("An event should have one and only one payload, found none")]
    MissingPayload,

    /// One-of invariant violated: more than one payload slot was set
    #[error("An event should have one and only one payload, found {count}")]
    MultiplePayloads {
        /// Number of payload slots that were set
        count: usize,
    },

    /// Tag text that names no known artifact kind
    #[error("Unknown artifact kind: {0:?}")]
    UnknownKind(String),

    /// Bulk read given neither CSV text nor a column mapping
    #[error("EventLog received an unsupported value type: {0}")]
    UnsupportedDataType(String),

    /// Positional access beyond the log's bounds
    #[error("Event index {index} out of range for log of length {len}")]
    IndexOutOfRange {
        /// Requested row index
        index: usize,
        /// Number of rows in the log
        len: usize,
    },

    /// Malformed CSV structure (header or row shape)
    #[error("Malformed event CSV: {0}")]
    Csv(String),

    /// Malformed column mapping (missing column, ragged lengths)
    #[error("Malformed event columns: {0}")]
    Columns(String),

    /// A value cell violates the field contract of the kind it was decoded against
    #[error("Failed to decode {kind} payload: {reason}")]
    PayloadDecode {
        /// Payload kind the value was decoded against
        kind: ArtifactKind,
        /// Underlying decode failure
        reason: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
