//! Arithmetic decoder (decompression).

use crate::interval::{BitChannel, DEFAULT_STATE_BITS, Interval};
use crate::model::{EOF_SYMBOL, FrequencyModel};
use squash_core::bitstream::BitReader;
use squash_core::error::{Result, SquashError};
use std::io::{Read, Write};

/// Bit source for the decoder: every renormalization step pulls one new
/// bit into the low end of `code`.
#[derive(Debug)]
struct BitSource<R: Read, const BITS: u32> {
    reader: BitReader<R>,
    code: u64,
}

impl<R: Read, const BITS: u32> BitChannel for BitSource<R, BITS> {
    fn on_shift(&mut self, _bit: bool) -> Result<()> {
        let bit = self.reader.read_bit()? as u64;
        self.code = ((self.code << 1) & Interval::<BITS>::STATE_MASK) | bit;
        Ok(())
    }

    fn on_underflow(&mut self) -> Result<()> {
        let bit = self.reader.read_bit()? as u64;
        // Keep the top bit, drop the second one, shift the rest up.
        self.code = (self.code & Interval::<BITS>::HALF_RANGE)
            | ((self.code << 1) & (Interval::<BITS>::STATE_MASK >> 1))
            | bit;
        Ok(())
    }
}

/// Arithmetic decoder mirroring [`crate::ArithmeticEncoder`].
#[derive(Debug)]
pub struct ArithmeticDecoder<R: Read, const BITS: u32 = { DEFAULT_STATE_BITS }> {
    model: FrequencyModel,
    interval: Interval<BITS>,
    source: BitSource<R, BITS>,
    /// Byte count the header promises.
    declared: u64,
    decoded: u64,
    finished: bool,
}

impl<R: Read, const BITS: u32> ArithmeticDecoder<R, BITS> {
    /// Create a decoder and prime its code value with the first `BITS`
    /// bits of `reader`. Missing bits read as zero.
    ///
    /// The model comes from a header, so an unusable model is reported as
    /// `CorruptHeader` before any bit is read.
    pub fn new(reader: BitReader<R>, model: FrequencyModel) -> Result<Self> {
        model.validate(BITS).map_err(|e| match e {
            SquashError::CorruptModel { message } => SquashError::corrupt_header(message),
            SquashError::PrecisionOverflow {
                total,
                limit,
                state_bits,
            } => SquashError::corrupt_header(format!(
                "symbol total {total} exceeds {limit} for {state_bits}-bit state"
            )),
            other => other,
        })?;

        let mut source = BitSource { reader, code: 0 };
        for _ in 0..BITS {
            source.code = (source.code << 1) | source.reader.read_bit()? as u64;
        }

        Ok(Self {
            declared: model.symbol_count(),
            decoded: 0,
            model,
            interval: Interval::new(),
            source,
            finished: false,
        })
    }

    /// The model driving this decoder.
    pub fn model(&self) -> &FrequencyModel {
        &self.model
    }

    /// Current `(low, high)` bounds of the coding interval.
    pub fn interval(&self) -> (u64, u64) {
        (self.interval.low(), self.interval.high())
    }

    /// Current code value; always inside [`ArithmeticDecoder::interval`].
    pub fn code(&self) -> u64 {
        self.source.code
    }

    /// Whether the sentinel has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of bytes the model says the stream holds.
    pub fn declared_symbols(&self) -> u64 {
        self.declared
    }

    /// Bytes decoded so far.
    pub fn decoded_symbols(&self) -> u64 {
        self.decoded
    }

    /// Zero bits consumed past the end of the coded stream.
    pub fn padding_bits(&self) -> u64 {
        self.source.reader.padding_bits()
    }

    /// Decode the next symbol. Returns [`EOF_SYMBOL`] at the end of the
    /// stream; calling again after that is an error.
    ///
    /// A damaged body cannot decode more bytes than the model declares:
    /// overrunning the count is `CorruptHeader`, and a sentinel before the
    /// count is reached is `UnexpectedEof`.
    pub fn decode_symbol(&mut self) -> Result<u16> {
        if self.finished {
            return Err(SquashError::invalid_state(
                "decoder already reached the end-of-stream symbol",
            ));
        }

        let low = self.interval.low();
        let code = self.source.code;
        debug_assert!(low <= code && code <= self.interval.high());

        let total = self.model.total();
        let value = ((code - low + 1) * total - 1) / self.interval.range();
        let symbol = self.model.symbol_for(value);

        if symbol == EOF_SYMBOL && self.decoded < self.declared {
            let missing = self.declared - self.decoded;
            return Err(SquashError::unexpected_eof(
                usize::try_from(missing).unwrap_or(usize::MAX),
            ));
        }
        if symbol != EOF_SYMBOL && self.decoded == self.declared {
            return Err(SquashError::corrupt_header(format!(
                "coded stream runs past the {} bytes declared in the header",
                self.declared
            )));
        }

        self.interval
            .update(&self.model, symbol, &mut self.source)?;

        if symbol == EOF_SYMBOL {
            self.finished = true;
        } else {
            self.decoded += 1;
        }
        Ok(symbol)
    }

    /// Decode every symbol up to the sentinel into `output`.
    ///
    /// Returns the number of bytes written.
    pub fn decode_to<W: Write>(&mut self, output: &mut W) -> Result<u64> {
        let mut buffer = Vec::with_capacity(64 * 1024);
        let mut written = 0u64;

        loop {
            let symbol = self.decode_symbol()?;
            if symbol == EOF_SYMBOL {
                break;
            }
            buffer.push(symbol as u8);

            if buffer.len() == buffer.capacity() {
                output.write_all(&buffer)?;
                written += buffer.len() as u64;
                buffer.clear();
            }
        }

        output.write_all(&buffer)?;
        written += buffer.len() as u64;

        tracing::debug!(
            bytes = written,
            padding_bits = self.padding_bits(),
            "arithmetic decoder finished"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ArithmeticEncoder;
    use squash_core::bitstream::BitWriter;
    use std::io::Cursor;

    fn encode(data: &[u8], model: &FrequencyModel) -> Vec<u8> {
        let mut encoder =
            ArithmeticEncoder::<_, 32>::new(BitWriter::new(Vec::new()), model.clone()).unwrap();
        encoder.encode_bytes(data).unwrap();
        encoder.finish().unwrap().0
    }

    fn decoder_for(body: Vec<u8>, model: FrequencyModel) -> ArithmeticDecoder<Cursor<Vec<u8>>, 32> {
        let len = body.len() as u64;
        ArithmeticDecoder::new(BitReader::new(Cursor::new(body), len), model).unwrap()
    }

    #[test]
    fn test_decode_symbol_by_symbol() {
        let original = b"abracadabra";
        let model = FrequencyModel::build(original);
        let mut decoder = decoder_for(encode(original, &model), model);

        for &byte in original.iter() {
            assert_eq!(decoder.decode_symbol().unwrap(), byte as u16);
            let (low, high) = decoder.interval();
            assert!(low <= decoder.code() && decoder.code() <= high);
        }
        assert_eq!(decoder.decode_symbol().unwrap(), EOF_SYMBOL);
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_decode_after_eof_fails() {
        let model = FrequencyModel::build(b"");
        let mut decoder = decoder_for(encode(b"", &model), model);

        assert_eq!(decoder.decode_symbol().unwrap(), EOF_SYMBOL);
        let err = decoder.decode_symbol().unwrap_err();
        assert!(matches!(err, SquashError::InvalidState { .. }));
    }

    #[test]
    fn test_zero_total_is_corrupt_header() {
        let reader = BitReader::new(Cursor::new(vec![0x80]), 1);
        let err = ArithmeticDecoder::<_, 32>::new(reader, FrequencyModel::new()).unwrap_err();
        assert!(matches!(err, SquashError::CorruptHeader { .. }));
    }

    #[test]
    fn test_oversized_total_is_corrupt_header() {
        let counts = [u32::MAX; 256];
        let model = FrequencyModel::from_counts(&counts);
        let reader = BitReader::new(Cursor::new(vec![0x80]), 1);
        let err = ArithmeticDecoder::<_, 32>::new(reader, model).unwrap_err();
        assert!(matches!(err, SquashError::CorruptHeader { .. }));
    }

    #[test]
    fn test_tolerates_missing_tail() {
        let original = b"padding past the end reads as zero bits";
        let model = FrequencyModel::build(original);
        let body = encode(original, &model);

        let mut decoder = decoder_for(body, model);
        let mut out = Vec::new();
        decoder.decode_to(&mut out).unwrap();
        assert_eq!(out, original);
        // The priming lookahead always runs past the final coded bit.
        assert!(decoder.padding_bits() > 0);
    }

    #[test]
    fn test_decode_large_buffered_output() {
        let original: Vec<u8> = (0..150_000u32).map(|i| (i % 97) as u8).collect();
        let model = FrequencyModel::build(&original);
        let mut decoder = decoder_for(encode(&original, &model), model);

        let mut out = Vec::new();
        let written = decoder.decode_to(&mut out).unwrap();
        assert_eq!(written, original.len() as u64);
        assert_eq!(out, original);
    }

    #[test]
    fn test_overrun_past_declared_count() {
        // Zero bits keep selecting byte 0 and never reach the sentinel.
        let mut counts = [0u32; 256];
        counts[0] = 1000;
        let model = FrequencyModel::from_counts(&counts);
        let mut decoder = decoder_for(vec![0x00], model);

        let err = decoder.decode_to(&mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, SquashError::CorruptHeader { .. }));
        assert_eq!(decoder.decoded_symbols(), 1000);
    }

    #[test]
    fn test_early_sentinel() {
        // An all-ones code sits in the sentinel's slice at once.
        let mut counts = [0u32; 256];
        counts[b'q' as usize] = 50;
        let model = FrequencyModel::from_counts(&counts);
        let mut decoder = decoder_for(vec![0xFF; 4], model);

        let err = decoder.decode_symbol().unwrap_err();
        assert!(matches!(err, SquashError::UnexpectedEof { expected: 50 }));
        assert_eq!(decoder.declared_symbols(), 50);
    }
}
