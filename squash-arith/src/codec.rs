//! File-level arithmetic codec: header framing around the coded stream.
//!
//! # Layout
//!
//! ```text
//! +-----------------------------+---------------------------------+
//! | 256 x u32 big-endian counts | coded bits, MSB-first, 0-padded |
//! +-----------------------------+---------------------------------+
//! ```
//!
//! The sentinel count (always 1) is implied. There is no length or
//! valid-bit field: the decoder stops at the sentinel and reads bits past
//! the end as zero.

use crate::decoder::ArithmeticDecoder;
use crate::encoder::ArithmeticEncoder;
use crate::interval::DEFAULT_STATE_BITS;
use crate::model::{FrequencyModel, HEADER_SIZE};
use squash_core::bitstream::{BitReader, BitWriter};
use squash_core::error::{Result, SquashError};
use squash_core::traits::{Codec, write_output};
use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Write};
use std::path::Path;

/// Extension of arithmetic-coded files.
pub const EXTENSION: &str = "AE";

/// Arithmetic coding behind the shared [`Codec`] contract.
///
/// `BITS` is the width of the coder state. Files are only readable by a
/// codec with the same width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArithmeticCodec<const BITS: u32 = { DEFAULT_STATE_BITS }>;

impl ArithmeticCodec {
    /// Codec with the default 32-bit state.
    pub const fn new() -> Self {
        Self
    }
}

impl<const BITS: u32> ArithmeticCodec<BITS> {
    /// Codec with a `BITS`-bit state.
    pub const fn with_precision() -> Self {
        Self
    }

    /// Write the header for `model` followed by the coded `input`.
    ///
    /// `input` must produce exactly the bytes `model` was built from;
    /// any other byte count is `InvalidState`. Returns the writer and the
    /// number of bytes written.
    pub fn encode_stream<R: Read, W: Write>(
        &self,
        model: &FrequencyModel,
        mut input: R,
        output: W,
    ) -> Result<(W, u64)> {
        // Reject before the first byte is written.
        model.validate(BITS)?;

        let mut writer = BitWriter::new(output);
        model.write_header(&mut writer)?;
        let mut encoder = ArithmeticEncoder::<W, BITS>::new(writer, model.clone())?;

        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let n = match input.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            encoder.encode_bytes(&buffer[..n])?;
        }

        // The decoder holds the stream to the byte count in the header.
        if encoder.symbols_encoded() != model.symbol_count() {
            return Err(SquashError::invalid_state(format!(
                "input has {} bytes but the model counts {}",
                encoder.symbols_encoded(),
                model.symbol_count()
            )));
        }
        encoder.finish()
    }

    /// Read the header from a stream of `len` bytes and set up a decoder.
    ///
    /// Everything that can be wrong with the header is reported here, before
    /// any output exists.
    pub fn open_stream<R: Read>(&self, input: R, len: u64) -> Result<ArithmeticDecoder<R, BITS>> {
        if len < HEADER_SIZE as u64 {
            return Err(SquashError::corrupt_header(format!(
                "stream of {len} bytes is shorter than the {HEADER_SIZE}-byte header"
            )));
        }

        let mut reader = BitReader::new(input, len);
        let model = FrequencyModel::read_header(&mut reader)?;

        // The encoder always emits at least one bit after the header.
        if reader.remaining_bytes() == 0 {
            return Err(SquashError::corrupt_header(
                "header is not followed by a coded stream",
            ));
        }

        ArithmeticDecoder::new(reader, model)
    }

    /// Encode `input` with an explicit model instead of one built from it.
    pub fn encode_with_model(&self, input: &[u8], model: &FrequencyModel) -> Result<Vec<u8>> {
        let output = Vec::with_capacity(HEADER_SIZE + input.len() / 2);
        let (output, _) = self.encode_stream(model, input, output)?;
        Ok(output)
    }
}

/// Output reservation for an in-memory decode. The declared size comes from
/// an unverified header, so it is capped relative to the input.
fn initial_capacity(declared: u64, input_len: usize) -> usize {
    const MAX_EXPANSION: u64 = 8;
    let cap = (input_len as u64).saturating_mul(MAX_EXPANSION);
    usize::try_from(declared.min(cap)).unwrap_or(usize::MAX)
}

impl<const BITS: u32> Codec for ArithmeticCodec<BITS> {
    fn name(&self) -> &'static str {
        "Arithmetic"
    }

    fn extension(&self) -> &'static str {
        EXTENSION
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let model = FrequencyModel::build(input);
        self.encode_with_model(input, &model)
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = self.open_stream(Cursor::new(input), input.len() as u64)?;
        let capacity = initial_capacity(decoder.declared_symbols(), input.len());
        let mut output = Vec::with_capacity(capacity);
        decoder.decode_to(&mut output)?;
        Ok(output)
    }

    fn compress_file_to(&self, input: &Path, output: &Path) -> Result<u64> {
        // Pass 1: the model must be final before any coded bit exists.
        let model = FrequencyModel::scan(BufReader::new(File::open(input)?))?;
        model.validate(BITS)?;
        tracing::debug!(
            input = %input.display(),
            symbols = model.symbol_count(),
            distinct = model.distinct_symbols(),
            "frequency model built"
        );

        // Pass 2: header, then the coded bytes.
        let source = BufReader::new(File::open(input)?);
        let written = write_output(output, |writer| {
            let (_, written) = self.encode_stream(&model, source, writer)?;
            Ok(written)
        })?;

        tracing::debug!(output = %output.display(), bytes = written, "compressed");
        Ok(written)
    }

    fn decompress_file_to(&self, input: &Path, output: &Path) -> Result<u64> {
        let file = File::open(input)?;
        let len = file.metadata()?.len();
        let mut decoder = self.open_stream(BufReader::new(file), len)?;

        let written = write_output(output, |writer| decoder.decode_to(writer))?;

        tracing::debug!(output = %output.display(), bytes = written, "decompressed");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let codec = ArithmeticCodec::new();
        let original = b"The quick brown fox jumps over the lazy dog.";
        let compressed = codec.compress(original).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_empty_layout() {
        let codec = ArithmeticCodec::new();
        let compressed = codec.compress(b"").unwrap();

        assert_eq!(compressed.len(), HEADER_SIZE + 1);
        assert!(compressed[..HEADER_SIZE].iter().all(|&b| b == 0));
        assert_eq!(compressed[HEADER_SIZE], 0x80);
        assert!(codec.decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_header_only_is_rejected() {
        let codec = ArithmeticCodec::new();
        let err = codec.decompress(&[0u8; HEADER_SIZE]).unwrap_err();
        assert!(matches!(err, SquashError::CorruptHeader { .. }));
    }

    #[test]
    fn test_short_header_is_rejected() {
        let codec = ArithmeticCodec::new();
        let err = codec.decompress(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, SquashError::CorruptHeader { .. }));
    }

    #[test]
    fn test_narrow_state_roundtrip() {
        let codec = ArithmeticCodec::<16>::with_precision();
        let original = b"sixteen bits of state are plenty for short inputs".repeat(20);
        let compressed = codec.compress(&original).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_narrow_state_rejects_large_total() {
        let codec = ArithmeticCodec::<12>::with_precision();
        let err = codec.compress(&[0u8; 2048]).unwrap_err();
        assert!(matches!(err, SquashError::PrecisionOverflow { .. }));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(100, 1028), 100);
        assert_eq!(initial_capacity((1 << 30) - 2, 1028), 1028 * 8);
        assert_eq!(initial_capacity(0, 0), 0);
    }

    #[test]
    fn test_model_must_match_input() {
        let codec = ArithmeticCodec::new();
        let model = FrequencyModel::build(b"aab");
        let err = codec.encode_with_model(b"ab", &model).unwrap_err();
        assert!(matches!(err, SquashError::InvalidState { .. }));
    }

    #[test]
    fn test_codec_identity() {
        let codec = ArithmeticCodec::new();
        assert_eq!(codec.name(), "Arithmetic");
        assert_eq!(codec.extension(), "AE");
    }
}
