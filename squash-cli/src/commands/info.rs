//! Info command implementation.

use super::Precision;
use crate::utils::format_size;
use serde::Serialize;
use squash_arith::{ArithmeticCodec, HEADER_SIZE};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JSON serializable summary of a compressed file's model.
#[derive(Debug, Serialize)]
struct ModelInfo {
    file: String,
    state_bits: u32,
    file_size: u64,
    header_size: u64,
    body_size: u64,
    symbols: u64,
    distinct_symbols: usize,
    entropy_bits_per_byte: f64,
    ideal_body_size: u64,
}

impl ModelInfo {
    fn read<const BITS: u32>(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let decoder =
            ArithmeticCodec::<BITS>::with_precision().open_stream(BufReader::new(file), file_size)?;
        let model = decoder.model();

        let entropy = model.entropy_bits();
        let symbols = model.symbol_count();

        Ok(Self {
            file: path.display().to_string(),
            state_bits: BITS,
            file_size,
            header_size: HEADER_SIZE as u64,
            body_size: file_size - HEADER_SIZE as u64,
            symbols,
            distinct_symbols: model.distinct_symbols(),
            entropy_bits_per_byte: entropy,
            ideal_body_size: (entropy * symbols as f64 / 8.0).ceil() as u64,
        })
    }

    fn print(&self) {
        println!("Compressed File Information");
        println!("===========================");
        println!("File: {}", self.file);
        println!("State width: {} bits", self.state_bits);
        println!("Size: {} bytes", self.file_size);
        println!();
        println!("Model:");
        println!("  Symbols: {}", self.symbols);
        println!("  Distinct byte values: {}", self.distinct_symbols);
        println!("  Entropy: {:.4} bits/byte", self.entropy_bits_per_byte);
        println!();
        println!("Layout:");
        println!("  Header: {}", format_size(self.header_size));
        println!("  Coded body: {}", format_size(self.body_size));
        println!("  Ideal body: {}", format_size(self.ideal_body_size));
        if self.ideal_body_size > 0 {
            println!(
                "  Overhead: {:.2}%",
                (self.body_size as f64 / self.ideal_body_size as f64 - 1.0) * 100.0
            );
        }
    }
}

pub fn cmd_info(
    input: &Path,
    precision: Precision,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let info = match precision {
        Precision::Bits16 => ModelInfo::read::<16>(input)?,
        Precision::Bits32 => ModelInfo::read::<32>(input)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        info.print();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_model_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.AE");
        fs::write(&path, squash_arith::compress(b"hello, hello").unwrap()).unwrap();

        let info = ModelInfo::read::<32>(&path).unwrap();
        assert_eq!(info.symbols, 12);
        assert_eq!(info.distinct_symbols, 6);
        assert_eq!(info.header_size, 1024);
        assert!(info.body_size > 0);
        assert!(info.entropy_bits_per_byte > 2.0 && info.entropy_bits_per_byte < 3.0);
    }

    #[test]
    fn test_model_info_rejects_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zeros.AE");
        fs::write(&path, vec![0u8; HEADER_SIZE]).unwrap();

        assert!(cmd_info(&path, Precision::Bits32, true).is_err());
    }
}
