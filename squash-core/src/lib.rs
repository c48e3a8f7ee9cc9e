//! # Squash Core
//!
//! Core components shared by the Squash codecs.
//!
//! - [`bitstream`]: MSB-first bit I/O with zero padding past the stream end
//! - [`traits`]: The [`Codec`] contract every algorithm implements
//! - [`paths`]: Compressed/decompressed output path derivation
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Driver                                              │
//! │     squash CLI: compress, decompress, bench, info       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Arithmetic coding (squash-arith)                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, Codec trait, paths             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use squash_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0xABC, 12).unwrap();
//! let (data, _) = writer.finish().unwrap();
//!
//! let len = data.len() as u64;
//! let mut reader = BitReader::new(Cursor::new(data), len);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod error;
pub mod paths;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{Result, SquashError};
pub use traits::{Codec, write_output};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{Result, SquashError};
    pub use crate::traits::Codec;
}
