//! # Squash-Arith: Pure Rust Arithmetic Coding
//!
//! This crate provides a static-model arithmetic coder over bytes, the
//! core codec of the Squash toolkit.
//!
//! ## Features
//!
//! - **Pure Rust**: No C dependencies, 100% safe Rust
//! - **Static model**: One whole-input frequency pass, transmitted in the header
//! - **Carry-safe**: Underflow (E3) bits are deferred until the interval settles
//! - **Configurable precision**: Coder state width is a const generic (default 32)
//!
//! ## Format
//!
//! - 256 big-endian `u32` byte counts (the end-of-stream count is implied)
//! - Coded bits, MSB-first, zero-padded to a byte
//! - Termination by an end-of-stream symbol; no length field
//!
//! ## Example
//!
//! ```rust
//! use squash_arith::{compress, decompress};
//!
//! let original = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let compressed = compress(original).unwrap();
//! let decompressed = decompress(&compressed).unwrap();
//!
//! assert_eq!(decompressed, original);
//! ```
//!
//! ## Working with the coder directly
//!
//! ```rust
//! use squash_arith::{ArithmeticDecoder, ArithmeticEncoder, FrequencyModel, EOF_SYMBOL};
//! use squash_core::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let data = b"abracadabra";
//! let model = FrequencyModel::build(data);
//!
//! let mut encoder: ArithmeticEncoder<_> =
//!     ArithmeticEncoder::new(BitWriter::new(Vec::new()), model.clone()).unwrap();
//! encoder.encode_bytes(data).unwrap();
//! let (body, _) = encoder.finish().unwrap();
//!
//! let len = body.len() as u64;
//! let mut decoder: ArithmeticDecoder<_> =
//!     ArithmeticDecoder::new(BitReader::new(Cursor::new(body), len), model).unwrap();
//! let mut out = Vec::new();
//! loop {
//!     let symbol = decoder.decode_symbol().unwrap();
//!     if symbol == EOF_SYMBOL {
//!         break;
//!     }
//!     out.push(symbol as u8);
//! }
//! assert_eq!(out, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod codec;
mod decoder;
mod encoder;
mod interval;
mod model;

pub use codec::{ArithmeticCodec, EXTENSION};
pub use decoder::ArithmeticDecoder;
pub use encoder::ArithmeticEncoder;
pub use interval::{DEFAULT_STATE_BITS, Interval, max_total};
pub use model::{EOF_SYMBOL, FrequencyModel, HEADER_SIZE, SYMBOL_COUNT};
pub use squash_core::error::{Result, SquashError};

use squash_core::traits::Codec;

/// Compress data with the default 32-bit arithmetic coder.
///
/// # Example
///
/// ```rust
/// use squash_arith::{compress, HEADER_SIZE};
///
/// let data = vec![b'X'; 10_000];
/// let compressed = compress(&data).unwrap();
/// assert!(compressed.len() < HEADER_SIZE + 100);
/// ```
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    ArithmeticCodec::new().compress(data)
}

/// Decompress data produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    ArithmeticCodec::new().decompress(data)
}

/// Compress `data` with an explicit model, e.g. one rebuilt from a header.
///
/// `model` must hold the exact byte counts of `data`, as a model rebuilt
/// from this data's header does.
pub fn compress_with_model(data: &[u8], model: &FrequencyModel) -> Result<Vec<u8>> {
    ArithmeticCodec::new().encode_with_model(data, model)
}
