//! Error types for the node layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NodeError>;

#[derive(Error, Debug)]
pub enum NodeError {
    /// Unknown kind tag, bad offset-table entry, or mid-record truncation.
    #[error("corrupt record: tag={tag:#04x} at offset {offset}: {reason}")]
    CorruptRecord {
        tag: u8,
        offset: usize,
        reason: String,
    },

    /// End of stream while a field was expected.
    #[error("truncated record at offset {offset}: expected {expected} more byte(s)")]
    TruncatedRecord { offset: usize, expected: usize },

    /// A varint decode consumed more continuation bytes than the target type allows.
    #[error("varint overflow at offset {0}")]
    VarintOverflow(usize),

    /// Number payload carried a type tag outside 0..=5.
    #[error("unknown number payload type tag: {0}")]
    UnknownNumberType(u8),

    /// I/O failure from a stream-style sink or source (`Write`/`Read`).
    /// Random-access `(segment, offset)` entry points never produce this.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn corrupt(tag: u8, offset: usize, reason: impl Into<String>) -> Self {
        NodeError::CorruptRecord {
            tag,
            offset,
            reason: reason.into(),
        }
    }
}
