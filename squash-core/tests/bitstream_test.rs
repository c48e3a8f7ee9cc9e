//! Property tests for the MSB-first bit stream.

use proptest::prelude::*;
use squash_core::bitstream::{BitReader, BitWriter};
use std::io::Cursor;

proptest! {
    #[test]
    fn test_bits_survive_roundtrip(bits in prop::collection::vec(any::<bool>(), 0..300)) {
        let mut writer = BitWriter::new(Vec::new());
        for &bit in &bits {
            writer.write_bit(bit).unwrap();
        }
        let (data, valid_bits) = writer.finish().unwrap();

        prop_assert_eq!(data.len(), bits.len().div_ceil(8));
        let expected_valid = if bits.len() % 8 == 0 { 8 } else { (bits.len() % 8) as u8 };
        prop_assert_eq!(valid_bits, expected_valid);

        let len = data.len() as u64;
        let mut reader = BitReader::new(Cursor::new(data), len);
        for &bit in &bits {
            prop_assert_eq!(reader.read_bit().unwrap(), bit);
        }

        // Everything after the written bits reads as zero.
        for _ in 0..40 {
            prop_assert!(!reader.read_bit().unwrap());
        }
    }

    #[test]
    fn test_header_then_bits(words in prop::collection::vec(any::<u32>(), 0..16), tail in any::<u16>()) {
        let mut writer = BitWriter::new(Vec::new());
        for word in &words {
            writer.write_raw_bytes(&word.to_be_bytes()).unwrap();
        }
        writer.write_bits(tail as u32, 16).unwrap();
        let (data, _) = writer.finish().unwrap();

        let len = data.len() as u64;
        let mut reader = BitReader::new(Cursor::new(data), len);
        for &word in &words {
            prop_assert_eq!(reader.read_u32_be().unwrap(), word);
        }
        prop_assert_eq!(reader.read_bits(16).unwrap(), tail as u32);
        prop_assert!(reader.is_exhausted());
    }
}
