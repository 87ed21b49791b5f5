//! Error types for the chat protocol library.
//!
//! Parsing itself never fails (unrecognized lines are classified as
//! [`Inbound::Other`](crate::Inbound::Other)); errors only come from reading
//! lines off the wire and from validating outbound text.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the maximum allowed length and was discarded.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Bytes consumed before the line was abandoned.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Outbound text was empty after sanitization.
    #[error("no text to send")]
    EmptyText,
}

impl ProtocolError {
    /// Whether the reader can keep going after this error.
    ///
    /// Oversize lines are skipped in full, so the stream stays framed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::LineTooLong { .. })
    }
}
