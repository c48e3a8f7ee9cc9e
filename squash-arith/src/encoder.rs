//! Arithmetic encoder (compression).

use crate::interval::{BitChannel, DEFAULT_STATE_BITS, Interval};
use crate::model::{EOF_SYMBOL, FrequencyModel};
use squash_core::bitstream::BitWriter;
use squash_core::error::{Result, SquashError};
use std::io::Write;

/// Bit sink for the encoder: settled bits go out immediately, followed by
/// any deferred underflow bits with the opposite value.
#[derive(Debug)]
struct BitSink<W: Write> {
    writer: BitWriter<W>,
    pending: u64,
}

impl<W: Write> BitChannel for BitSink<W> {
    fn on_shift(&mut self, bit: bool) -> Result<()> {
        self.writer.write_bit(bit)?;
        while self.pending > 0 {
            self.writer.write_bit(!bit)?;
            self.pending -= 1;
        }
        Ok(())
    }

    fn on_underflow(&mut self) -> Result<()> {
        self.pending += 1;
        Ok(())
    }
}

/// Arithmetic encoder over a static [`FrequencyModel`].
///
/// The model must already be complete: the decoder rebuilds it from the
/// header before reading a single coded bit, so it cannot change while
/// encoding.
#[derive(Debug)]
pub struct ArithmeticEncoder<W: Write, const BITS: u32 = { DEFAULT_STATE_BITS }> {
    model: FrequencyModel,
    interval: Interval<BITS>,
    sink: BitSink<W>,
    symbols: u64,
}

impl<W: Write, const BITS: u32> ArithmeticEncoder<W, BITS> {
    /// Create an encoder writing coded bits to `writer`.
    ///
    /// Fails with `CorruptModel` for an empty model and `PrecisionOverflow`
    /// if the model total does not fit `BITS` of state.
    pub fn new(writer: BitWriter<W>, model: FrequencyModel) -> Result<Self> {
        model.validate(BITS)?;

        Ok(Self {
            model,
            interval: Interval::new(),
            sink: BitSink { writer, pending: 0 },
            symbols: 0,
        })
    }

    /// The model driving this encoder.
    pub fn model(&self) -> &FrequencyModel {
        &self.model
    }

    /// Current `(low, high)` bounds of the coding interval.
    pub fn interval(&self) -> (u64, u64) {
        (self.interval.low(), self.interval.high())
    }

    /// Underflow bits waiting for the next settled bit.
    pub fn pending_bits(&self) -> u64 {
        self.sink.pending
    }

    /// Bytes encoded so far.
    pub fn symbols_encoded(&self) -> u64 {
        self.symbols
    }

    /// Bits written so far, including any raw header bytes.
    pub fn bits_written(&self) -> u64 {
        self.sink.writer.bits_written()
    }

    /// Encode one symbol.
    ///
    /// The sentinel is reserved for [`ArithmeticEncoder::finish`].
    pub fn encode_symbol(&mut self, symbol: u16) -> Result<()> {
        if symbol == EOF_SYMBOL {
            return Err(SquashError::invalid_state(
                "the end-of-stream symbol is written by finish()",
            ));
        }
        self.interval.update(&self.model, symbol, &mut self.sink)?;
        self.symbols += 1;
        Ok(())
    }

    /// Encode every byte of `data`.
    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.interval.update(&self.model, byte as u16, &mut self.sink)?;
            self.symbols += 1;
        }
        Ok(())
    }

    /// Encode the sentinel, emit the final disambiguating bit and flush.
    ///
    /// Returns the underlying writer and the total number of bytes written
    /// through this encoder's bit writer.
    pub fn finish(mut self) -> Result<(W, u64)> {
        self.interval
            .update(&self.model, EOF_SYMBOL, &mut self.sink)?;
        // One more bit places the code strictly inside the final interval
        // for a decoder that reads zeros past the end.
        self.sink.writer.write_bit(true)?;

        let bits = self.sink.writer.bits_written();
        let (writer, valid_bits) = self.sink.writer.finish()?;
        tracing::debug!(
            symbols = self.symbols,
            bits,
            last_byte_bits = valid_bits,
            "arithmetic encoder finished"
        );
        Ok((writer, bits.div_ceil(8)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ArithmeticDecoder;
    use squash_core::bitstream::BitReader;
    use std::io::Cursor;

    fn encode(data: &[u8], model: &FrequencyModel) -> Vec<u8> {
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model.clone()).unwrap();
        encoder.encode_bytes(data).unwrap();
        encoder.finish().unwrap().0
    }

    fn decode(body: Vec<u8>, model: &FrequencyModel) -> Vec<u8> {
        let len = body.len() as u64;
        let reader = BitReader::new(Cursor::new(body), len);
        let mut decoder = ArithmeticDecoder::<_, 32>::new(reader, model.clone()).unwrap();
        let mut out = Vec::new();
        decoder.decode_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_encode_simple() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        let model = FrequencyModel::build(original);
        let body = encode(original, &model);

        assert!(body.len() < original.len());
        assert_eq!(decode(body, &model), original);
    }

    #[test]
    fn test_encode_empty() {
        let model = FrequencyModel::build(b"");
        let body = encode(b"", &model);

        // Sentinel alone takes the whole interval; only the final bit remains.
        assert_eq!(body, vec![0x80]);
        assert!(decode(body, &model).is_empty());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let original = b"determinism matters for reproducible archives";
        let model = FrequencyModel::build(original);
        assert_eq!(encode(original, &model), encode(original, &model));
    }

    #[test]
    fn test_interval_invariant() {
        let original = b"low never passes high, whatever the input looks like";
        let model = FrequencyModel::build(original);
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model).unwrap();

        for &byte in original.iter() {
            encoder.encode_symbol(byte as u16).unwrap();
            let (low, high) = encoder.interval();
            assert!(low <= high);
        }
    }

    #[test]
    fn test_sentinel_reserved() {
        let model = FrequencyModel::build(b"x");
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model).unwrap();
        let err = encoder.encode_symbol(EOF_SYMBOL).unwrap_err();
        assert!(matches!(err, SquashError::InvalidState { .. }));
    }

    #[test]
    fn test_symbol_missing_from_model() {
        let model = FrequencyModel::build(b"abc");
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model).unwrap();
        let err = encoder.encode_bytes(b"abd").unwrap_err();
        assert!(matches!(err, SquashError::CorruptModel { .. }));
    }

    #[test]
    fn test_rejects_empty_model() {
        let err = ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), FrequencyModel::new())
            .unwrap_err();
        assert!(matches!(err, SquashError::CorruptModel { .. }));
    }

    #[test]
    fn test_rejects_precision_overflow() {
        let data = vec![1u8; 1 << 12];
        let model = FrequencyModel::build(&data);
        let err = ArithmeticEncoder::<_, 12>::new(BitWriter::new(Vec::new()), model).unwrap_err();
        assert!(matches!(
            err,
            SquashError::PrecisionOverflow { state_bits: 12, .. }
        ));
    }

    #[test]
    fn test_underflow_bits_are_released() {
        // Alternating neighbours keep the interval near the midpoint.
        let original: Vec<u8> = (0..400).map(|i| if i % 2 == 0 { 0x7F } else { 0x80 }).collect();
        let model = FrequencyModel::build(&original);
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model.clone()).unwrap();
        encoder.encode_bytes(&original).unwrap();
        let (body, bytes) = encoder.finish().unwrap();

        assert_eq!(bytes as usize, body.len());
        assert_eq!(decode(body, &model), original);
    }

    #[test]
    fn test_symbol_count_stops_at_failure() {
        let model = FrequencyModel::build(b"abc");
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model).unwrap();
        encoder.encode_symbol(b'a' as u16).unwrap();
        assert!(encoder.encode_bytes(b"bczz").is_err());
        assert_eq!(encoder.symbols_encoded(), 3);
    }
}
