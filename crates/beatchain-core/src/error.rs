//! Error types for beatchain

use thiserror::Error;

/// Core beatchain errors
#[derive(Error, Debug)]
pub enum BeatError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Message too long: limit is {limit} bytes")]
    MessageTooLong { limit: usize },

    // Integrity errors
    #[error("Empty chain")]
    EmptyChain,

    #[error("Invalid genesis record")]
    InvalidGenesis,

    #[error("Invalid index: expected {expected}, got {got}")]
    InvalidIndex { expected: u64, got: u64 },

    #[error("Invalid prev_hash at index {index}: expected {expected}, got {got}")]
    InvalidPrevHash {
        index: u64,
        expected: String,
        got: String,
    },

    #[error("Hash mismatch at index {index}")]
    HashMismatch { index: u64 },

    #[error("Record {index} rejected: does not extend the current tail")]
    RecordRejected { index: u64 },

    // Input errors
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Session closed")]
    SessionClosed,
}

/// Result type for beatchain operations
pub type BeatResult<T> = Result<T, BeatError>;
