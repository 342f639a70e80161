//! Error types for the Wallframe core.
//!
//! The readers in [`crate::bitstream`] only ever fail because the input ran
//! out or a caller asked for an unsupported bit width.

use thiserror::Error;

/// Main error type for the Wallframe core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bitstream parsing errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Bitstream parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitstreamError {
    /// A read would run past the end of the buffer.
    #[error("Unexpected end of data at offset {offset}: need {needed} bytes, have {available}")]
    UnexpectedEnd {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Check if this error was caused by truncated input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Bitstream(BitstreamError::UnexpectedEnd { .. }))
    }
}
