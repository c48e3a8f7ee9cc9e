//! Error types for Squash operations.
//!
//! Every codec in the workspace reports failures through [`SquashError`].
//! Header and model problems are detected before any symbol is decoded, and
//! precision problems before any coded bit is written.

use std::io;
use thiserror::Error;

/// The main error type for Squash operations.
#[derive(Debug, Error)]
pub enum SquashError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The compressed header cannot describe a decodable stream.
    #[error("Corrupt header: {message}")]
    CorruptHeader {
        /// Description of the header error.
        message: String,
    },

    /// The frequency model is unusable for coding.
    #[error("Corrupt model: {message}")]
    CorruptModel {
        /// Description of the model error.
        message: String,
    },

    /// The symbol total does not fit the coder's precision.
    #[error("Precision overflow: total {total} exceeds limit {limit} for {state_bits}-bit state")]
    PrecisionOverflow {
        /// Total symbol count of the model.
        total: u64,
        /// Largest total the coder accepts.
        limit: u64,
        /// Width of the coder state in bits.
        state_bits: u32,
    },

    /// Symbol outside the coder alphabet.
    #[error("Invalid symbol {symbol} (alphabet size {alphabet})")]
    InvalidSymbol {
        /// The offending symbol.
        symbol: u32,
        /// Number of symbols in the alphabet.
        alphabet: u32,
    },

    /// Operation not allowed in the current coder state.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// What was attempted.
        message: String,
    },

    /// Unexpected end of file.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Round-trip verification produced a different digest.
    #[error("Digest mismatch: original {original}, round-trip {roundtrip}")]
    DigestMismatch {
        /// Hex digest of the original file.
        original: String,
        /// Hex digest of the decompressed file.
        roundtrip: String,
    },
}

/// Result type alias for Squash operations.
pub type Result<T> = std::result::Result<T, SquashError>;

impl SquashError {
    /// Create a corrupt header error.
    pub fn corrupt_header(message: impl Into<String>) -> Self {
        Self::CorruptHeader {
            message: message.into(),
        }
    }

    /// Create a corrupt model error.
    pub fn corrupt_model(message: impl Into<String>) -> Self {
        Self::CorruptModel {
            message: message.into(),
        }
    }

    /// Create a precision overflow error.
    pub fn precision_overflow(total: u64, limit: u64, state_bits: u32) -> Self {
        Self::PrecisionOverflow {
            total,
            limit,
            state_bits,
        }
    }

    /// Create an invalid symbol error.
    pub fn invalid_symbol(symbol: u32, alphabet: u32) -> Self {
        Self::InvalidSymbol { symbol, alphabet }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a digest mismatch error.
    pub fn digest_mismatch(original: impl Into<String>, roundtrip: impl Into<String>) -> Self {
        Self::DigestMismatch {
            original: original.into(),
            roundtrip: roundtrip.into(),
        }
    }

    /// Whether the error describes damaged compressed input rather than I/O.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::CorruptHeader { .. } | Self::CorruptModel { .. } | Self::UnexpectedEof { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SquashError::corrupt_header("all counts are zero");
        assert!(err.to_string().contains("Corrupt header"));
        assert!(err.to_string().contains("all counts are zero"));

        let err = SquashError::precision_overflow(1 << 31, 1 << 30, 32);
        assert!(err.to_string().contains("32-bit"));

        let err = SquashError::invalid_symbol(300, 257);
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SquashError = io_err.into();
        assert!(matches!(err, SquashError::Io(_)));
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_corruption_classification() {
        assert!(SquashError::corrupt_header("x").is_corruption());
        assert!(SquashError::corrupt_model("x").is_corruption());
        assert!(!SquashError::invalid_state("x").is_corruption());
    }
}
