//! Bit-level I/O for entropy coders.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data one bit at a time on top of any byte-oriented `Read` or `Write`.
//!
//! # Bit Ordering
//!
//! Bits are packed MSB-first: the first bit written lands in the most
//! significant bit of the first byte. A partial trailing byte is padded with
//! zero bits.
//!
//! # End of stream
//!
//! `BitReader` is told the encoded length up front. Once those bytes are
//! consumed it keeps returning `0` bits instead of failing, which is what an
//! arithmetic decoder with a fixed-width lookahead needs at the tail of a
//! stream.
//!
//! # Example
//!
//! ```
//! use squash_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bit(true).unwrap();
//! let (output, valid_bits) = writer.finish().unwrap();
//! assert_eq!(output, vec![0b1011_0000]);
//! assert_eq!(valid_bits, 4);
//!
//! let len = output.len() as u64;
//! let mut reader = BitReader::new(Cursor::new(output), len);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
//! ```

use crate::error::{Result, SquashError};
use std::io::{ErrorKind, Read, Write};

/// A bit-level reader over a stream of known length.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bytes of the stream not yet pulled from the reader.
    remaining: u64,
    /// Byte currently being consumed.
    current: u8,
    /// Unread bits left in `current`.
    bits_left: u8,
    /// Total bits read, padding included.
    total_bits_read: u64,
    /// Zero bits handed out past the end of the stream.
    padding_bits: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` over `len` bytes of `reader`.
    pub fn new(reader: R, len: u64) -> Self {
        Self {
            reader,
            remaining: len,
            current: 0,
            bits_left: 0,
            total_bits_read: 0,
            padding_bits: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Get the total number of bits read so far, padding included.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of zero bits returned after the stream ran out.
    pub fn padding_bits(&self) -> u64 {
        self.padding_bits
    }

    /// Whether every byte of the stream has been pulled and consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0 && self.bits_left == 0
    }

    /// Bytes of the stream still unread.
    pub fn remaining_bytes(&self) -> u64 {
        self.remaining
    }

    /// Pull the next byte of the stream, or `None` past its end.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    // Shorter than announced; the tail reads as padding.
                    tracing::trace!(
                        missing = self.remaining,
                        "bit stream ended before its declared length"
                    );
                    self.remaining = 0;
                    return Ok(None);
                }
                Ok(_) => {
                    self.remaining -= 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a single bit. Returns `false` once the stream is exhausted.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.bits_left = 8;
                }
                None => {
                    self.padding_bits += 1;
                    self.total_bits_read += 1;
                    return Ok(false);
                }
            }
        }

        self.bits_left -= 1;
        self.total_bits_read += 1;
        Ok((self.current >> self.bits_left) & 1 != 0)
    }

    /// Read up to 32 bits, first bit read in the most significant position.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Read bytes directly, bypassing the bit buffer.
    ///
    /// The reader must be byte-aligned. Unlike bit reads, running out of
    /// stream here is an error.
    pub fn read_raw_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.bits_left != 0 {
            return Err(SquashError::invalid_state(
                "raw byte read on an unaligned bit reader",
            ));
        }

        for (i, slot) in buf.iter_mut().enumerate() {
            match self.next_byte()? {
                Some(byte) => *slot = byte,
                None => return Err(SquashError::unexpected_eof(buf.len() - i)),
            }
        }
        self.total_bits_read += buf.len() as u64 * 8;
        Ok(())
    }

    /// Read a byte-aligned big-endian `u32`.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_raw_bytes(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// Bits accumulate MSB-first and each completed byte goes straight to the
/// underlying writer. Call [`BitWriter::finish`] to emit the padded
/// trailing byte and get the writer back.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Partial byte, filled from the MSB down.
    buffer: u8,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Whether the writer sits on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.bits_in_buffer == 0
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.bits_in_buffer += 1;
        self.total_bits_written += 1;

        if self.bits_in_buffer == 8 {
            self.writer.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }

        Ok(())
    }

    /// Write the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 != 0)?;
        }
        Ok(())
    }

    /// Write one byte directly, bypassing bit accumulation.
    ///
    /// Only valid on a byte boundary; header fields are aligned by
    /// construction.
    pub fn write_raw_byte(&mut self, byte: u8) -> Result<()> {
        self.write_raw_bytes(&[byte])
    }

    /// Write bytes directly, bypassing bit accumulation.
    pub fn write_raw_bytes(&mut self, buf: &[u8]) -> Result<()> {
        if !self.is_aligned() {
            return Err(SquashError::invalid_state(
                "raw byte write on an unaligned bit writer",
            ));
        }

        self.writer.write_all(buf)?;
        self.total_bits_written += buf.len() as u64 * 8;
        Ok(())
    }

    /// Flush the trailing partial byte (zero padded) and the writer.
    ///
    /// Returns the writer and the number of valid bits in the final byte
    /// (8 when the stream ended on a byte boundary).
    pub fn finish(mut self) -> Result<(W, u8)> {
        let valid_bits = if self.bits_in_buffer == 0 {
            8
        } else {
            let valid = self.bits_in_buffer;
            let byte = self.buffer << (8 - valid);
            self.writer.write_all(&[byte])?;
            valid
        };

        self.writer.flush()?;
        Ok((self.writer, valid_bits))
    }
}
