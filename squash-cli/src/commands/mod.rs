//! Command implementations for Squash CLI.

pub mod bench;
pub mod compress;
pub mod decompress;
pub mod info;

pub use bench::cmd_bench;
pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use info::cmd_info;

use clap::ValueEnum;
use squash_arith::ArithmeticCodec;
use squash_core::traits::Codec;

/// Coder state width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Precision {
    /// 16-bit state (model totals up to 16384)
    #[value(name = "16")]
    Bits16,
    /// 32-bit state (default)
    #[default]
    #[value(name = "32")]
    Bits32,
}

impl Precision {
    /// State width in bits.
    pub fn bits(self) -> u32 {
        match self {
            Precision::Bits16 => 16,
            Precision::Bits32 => 32,
        }
    }

    /// The codec for this width.
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            Precision::Bits16 => Box::new(ArithmeticCodec::<16>::with_precision()),
            Precision::Bits32 => Box::new(ArithmeticCodec::new()),
        }
    }
}
