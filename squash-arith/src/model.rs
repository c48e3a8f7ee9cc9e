//! Static frequency model over the 257-symbol alphabet.
//!
//! The model counts every byte of the input once and adds a single
//! occurrence of the end-of-stream sentinel. Its cumulative table gives each
//! symbol a half-open slice `[low, high)` of `[0, total)`.
//!
//! The cumulative table is cached and invalidated by [`FrequencyModel::increment`],
//! so building a model byte by byte costs one prefix-sum pass at first use.

use crate::interval::max_total;
use squash_core::bitstream::{BitReader, BitWriter};
use squash_core::error::{Result, SquashError};
use std::cell::OnceCell;
use std::io::{ErrorKind, Read, Write};

/// Number of symbols: 256 byte values plus the sentinel.
pub const SYMBOL_COUNT: usize = 257;

/// The end-of-stream sentinel symbol.
pub const EOF_SYMBOL: u16 = 256;

/// Size of the serialized model: one big-endian `u32` per byte value.
pub const HEADER_SIZE: usize = 256 * 4;

/// Per-symbol occurrence counts with a derived cumulative distribution.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    frequencies: [u64; SYMBOL_COUNT],
    total: u64,
    /// Prefix sums, `SYMBOL_COUNT + 1` entries once computed.
    cumulative: OnceCell<Vec<u64>>,
}

impl FrequencyModel {
    /// An empty model: every count is zero, sentinel included.
    pub fn new() -> Self {
        Self {
            frequencies: [0; SYMBOL_COUNT],
            total: 0,
            cumulative: OnceCell::new(),
        }
    }

    /// Count every byte of `data` and add one sentinel occurrence.
    pub fn build(data: &[u8]) -> Self {
        let mut model = Self::new();
        for &byte in data {
            model.frequencies[byte as usize] += 1;
        }
        model.frequencies[EOF_SYMBOL as usize] = 1;
        model.total = data.len() as u64 + 1;
        model
    }

    /// Count every byte produced by `reader` and add one sentinel occurrence.
    ///
    /// This is the first pass of file compression.
    pub fn scan<R: Read>(mut reader: R) -> Result<Self> {
        let mut model = Self::new();
        let mut buffer = vec![0u8; 64 * 1024];
        let mut scanned = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &buffer[..n] {
                model.frequencies[byte as usize] += 1;
            }
            scanned += n as u64;
        }

        model.frequencies[EOF_SYMBOL as usize] = 1;
        model.total = scanned + 1;
        tracing::trace!(bytes = scanned, "frequency scan complete");
        Ok(model)
    }

    /// Build a model from the 256 stored byte counts; the sentinel count of
    /// one is implied.
    pub fn from_counts(counts: &[u32; 256]) -> Self {
        let mut model = Self::new();
        for (slot, &count) in model.frequencies.iter_mut().zip(counts) {
            *slot = count as u64;
        }
        model.frequencies[EOF_SYMBOL as usize] = 1;
        model.total = model.frequencies.iter().sum();
        model
    }

    /// Add one occurrence of `symbol`.
    pub fn increment(&mut self, symbol: u16) -> Result<()> {
        check_symbol(symbol)?;
        self.frequencies[symbol as usize] += 1;
        self.total += 1;
        self.cumulative.take();
        Ok(())
    }

    /// Occurrence count of `symbol`.
    pub fn frequency(&self, symbol: u16) -> u64 {
        self.frequencies[symbol as usize]
    }

    /// Sum of all counts, sentinel included.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of real (non-sentinel) symbols counted.
    pub fn symbol_count(&self) -> u64 {
        self.frequencies[..EOF_SYMBOL as usize].iter().sum()
    }

    /// Number of byte values that occur at least once.
    pub fn distinct_symbols(&self) -> usize {
        self.frequencies[..EOF_SYMBOL as usize]
            .iter()
            .filter(|&&count| count > 0)
            .count()
    }

    /// The cumulative table: `SYMBOL_COUNT + 1` entries, starting at 0 and
    /// ending at [`FrequencyModel::total`].
    pub fn cumulative(&self) -> &[u64] {
        self.cumulative.get_or_init(|| {
            let mut table = Vec::with_capacity(SYMBOL_COUNT + 1);
            let mut sum = 0u64;
            table.push(sum);
            for &count in &self.frequencies {
                sum += count;
                table.push(sum);
            }
            table
        })
    }

    /// Cumulative count of all symbols below `symbol`.
    #[inline]
    pub fn low(&self, symbol: u16) -> u64 {
        self.cumulative()[symbol as usize]
    }

    /// Cumulative count of all symbols up to and including `symbol`.
    #[inline]
    pub fn high(&self, symbol: u16) -> u64 {
        self.cumulative()[symbol as usize + 1]
    }

    /// Find the symbol whose slice contains `value`.
    ///
    /// `value` must lie in `[0, total)`; the result `s` satisfies
    /// `low(s) <= value < high(s)`.
    pub fn symbol_for(&self, value: u64) -> u16 {
        debug_assert!(value < self.total, "value {value} outside [0, {})", self.total);

        let cumulative = self.cumulative();
        let mut start = 0usize;
        let mut end = SYMBOL_COUNT;
        while end - start > 1 {
            let middle = (start + end) / 2;
            if cumulative[middle] > value {
                end = middle;
            } else {
                start = middle;
            }
        }
        start as u16
    }

    /// Check that the model can drive a coder with `state_bits` of state.
    pub fn validate(&self, state_bits: u32) -> Result<()> {
        if self.total == 0 {
            return Err(SquashError::corrupt_model("symbol total is zero"));
        }

        let limit = max_total(state_bits);
        if self.total > limit {
            return Err(SquashError::precision_overflow(
                self.total, limit, state_bits,
            ));
        }
        Ok(())
    }

    /// Zeroth-order entropy of the byte distribution, in bits per byte.
    pub fn entropy_bits(&self) -> f64 {
        let n = self.symbol_count();
        if n == 0 {
            return 0.0;
        }

        self.frequencies[..EOF_SYMBOL as usize]
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / n as f64;
                -p * p.log2()
            })
            .sum()
    }

    /// Serialize the 256 byte counts as big-endian `u32`s.
    ///
    /// The sentinel count is implied and never written.
    pub fn write_header<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        let mut header = Vec::with_capacity(HEADER_SIZE);
        for &count in &self.frequencies[..EOF_SYMBOL as usize] {
            let count = u32::try_from(count).map_err(|_| {
                SquashError::precision_overflow(count, u32::MAX as u64, 32)
            })?;
            header.extend_from_slice(&count.to_be_bytes());
        }
        writer.write_raw_bytes(&header)
    }

    /// Deserialize a model written by [`FrequencyModel::write_header`].
    pub fn read_header<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let mut counts = [0u32; 256];
        for (symbol, slot) in counts.iter_mut().enumerate() {
            *slot = reader.read_u32_be().map_err(|e| match e {
                SquashError::UnexpectedEof { .. } => SquashError::corrupt_header(format!(
                    "header truncated at symbol {symbol} of 256"
                )),
                other => other,
            })?;
        }

        let model = Self::from_counts(&counts);
        tracing::trace!(
            total = model.total(),
            distinct = model.distinct_symbols(),
            "frequency header read"
        );
        Ok(model)
    }
}

impl Default for FrequencyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FrequencyModel {
    fn eq(&self, other: &Self) -> bool {
        self.frequencies == other.frequencies
    }
}

impl Eq for FrequencyModel {}

/// Reject symbols outside the alphabet.
pub(crate) fn check_symbol(symbol: u16) -> Result<()> {
    if symbol as usize >= SYMBOL_COUNT {
        return Err(SquashError::invalid_symbol(
            symbol as u32,
            SYMBOL_COUNT as u32,
        ));
    }
    Ok(())
}
