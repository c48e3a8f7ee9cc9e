//! Interval arithmetic shared by the encoder and the decoder.
//!
//! Both sides narrow the same `[low, high]` interval with the same integer
//! arithmetic and renormalize it with the same two loops. The only
//! difference is what happens to a bit at each step: the encoder emits it,
//! the decoder shifts a fresh one into its code value. That difference is
//! captured by [`BitChannel`], so the algebra lives in exactly one place.
//!
//! # Renormalization
//!
//! - **E1/E2**: the top bits of `low` and `high` agree, so that bit is
//!   settled. Shift it out; `low` fills with 0, `high` with 1.
//! - **E3**: `low = 01...`, `high = 10...`. The interval straddles the
//!   midpoint inside the middle half. Remove the second-highest bit from
//!   both and count a deferred bit whose value the next E1/E2 step decides.

use crate::model::{FrequencyModel, check_symbol};
use squash_core::error::{Result, SquashError};

/// Default width of the coder state in bits.
pub const DEFAULT_STATE_BITS: u32 = 32;

/// Largest symbol total a coder with `state_bits` of state accepts.
///
/// The total may not exceed a quarter of the full range, so every symbol
/// with a nonzero count keeps a nonzero slice after renormalization, and
/// `total * range` must fit the 64-bit intermediate product.
pub const fn max_total(state_bits: u32) -> u64 {
    let quarter = 1u64 << (state_bits - 2);
    let product_limit = u64::MAX >> state_bits;
    if quarter < product_limit {
        quarter
    } else {
        product_limit
    }
}

/// What the renormalization loops do with each settled or deferred bit.
pub(crate) trait BitChannel {
    /// The top bit of the interval is settled as `bit` and shifted out.
    fn on_shift(&mut self, bit: bool) -> Result<()>;

    /// An E3 step removed the second-highest bit.
    fn on_underflow(&mut self) -> Result<()>;
}

/// The coding interval `[low, high]` over `BITS`-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval<const BITS: u32 = { DEFAULT_STATE_BITS }> {
    low: u64,
    high: u64,
}

impl<const BITS: u32> Interval<BITS> {
    const WIDTH_OK: () = assert!(
        BITS >= 8 && BITS <= 62,
        "coder state must be between 8 and 62 bits wide"
    );

    /// Number of representable state values, `2^BITS`.
    pub const FULL_RANGE: u64 = 1 << BITS;
    /// `2^(BITS - 1)`: the top bit of the state.
    pub const HALF_RANGE: u64 = Self::FULL_RANGE >> 1;
    /// `2^(BITS - 2)`: the second-highest bit of the state.
    pub const QUARTER_RANGE: u64 = Self::HALF_RANGE >> 1;
    /// `2^BITS - 1`.
    pub const STATE_MASK: u64 = Self::FULL_RANGE - 1;
    /// Largest symbol total this width accepts.
    pub const MAX_TOTAL: u64 = max_total(BITS);

    /// The full interval `[0, 2^BITS - 1]`.
    pub fn new() -> Self {
        let () = Self::WIDTH_OK;
        Self {
            low: 0,
            high: Self::STATE_MASK,
        }
    }

    /// Lower bound, inclusive.
    pub fn low(&self) -> u64 {
        self.low
    }

    /// Upper bound, inclusive.
    pub fn high(&self) -> u64 {
        self.high
    }

    /// Number of values in the interval.
    pub fn range(&self) -> u64 {
        self.high - self.low + 1
    }

    /// Narrow the interval to `symbol`'s slice and renormalize, routing
    /// every settled or deferred bit through `channel`.
    pub(crate) fn update<C: BitChannel>(
        &mut self,
        model: &FrequencyModel,
        symbol: u16,
        channel: &mut C,
    ) -> Result<()> {
        check_symbol(symbol)?;

        let total = model.total();
        let sym_low = model.low(symbol);
        let sym_high = model.high(symbol);
        if sym_low == sym_high {
            return Err(SquashError::corrupt_model(format!(
                "symbol {symbol} has zero frequency"
            )));
        }

        let range = self.range();
        let new_low = self.low + sym_low * range / total;
        let new_high = self.low + sym_high * range / total - 1;
        self.low = new_low;
        self.high = new_high;
        debug_assert!(self.low <= self.high);

        // E1/E2: top bits agree.
        while (self.low ^ self.high) & Self::HALF_RANGE == 0 {
            channel.on_shift(self.low & Self::HALF_RANGE != 0)?;
            self.low = (self.low << 1) & Self::STATE_MASK;
            self.high = ((self.high << 1) & Self::STATE_MASK) | 1;
        }

        // E3: low = 01..., high = 10...
        while self.low & !self.high & Self::QUARTER_RANGE != 0 {
            channel.on_underflow()?;
            self.low = (self.low << 1) ^ Self::HALF_RANGE;
            self.high = ((self.high ^ Self::HALF_RANGE) << 1) | Self::HALF_RANGE | 1;
        }

        debug_assert!(self.low <= self.high && self.high <= Self::STATE_MASK);
        Ok(())
    }
}

impl<const BITS: u32> Default for Interval<BITS> {
    fn default() -> Self {
        Self::new()
    }
}
