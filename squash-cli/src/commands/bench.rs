//! Bench command implementation.
//!
//! Compresses a file next to itself, decompresses the result and compares
//! SHA-256 digests of the original and the round-tripped file.

use super::Precision;
use crate::utils::{check_output, compression_ratio, format_size, sha256_file};
use serde::Serialize;
use squash_core::error::SquashError;
use squash_core::paths::{compressed_path, decompressed_path};
use std::path::Path;
use std::time::Instant;

/// JSON serializable benchmark report.
#[derive(Debug, Serialize)]
struct BenchReport {
    input: String,
    compressed: String,
    decompressed: String,
    state_bits: u32,
    original_size: u64,
    compressed_size: u64,
    ratio: f64,
    compress_secs: f64,
    decompress_secs: f64,
    original_sha256: String,
    roundtrip_sha256: String,
    identical: bool,
}

impl BenchReport {
    fn print(&self) {
        println!("Benchmark: {} ({}-bit state)", self.input, self.state_bits);
        println!("{}", "-".repeat(60));
        println!(
            "Compressed   {} -> {} in {:.3}s",
            format_size(self.original_size),
            format_size(self.compressed_size),
            self.compress_secs
        );
        println!("Ratio        {:.3}", self.ratio);
        println!("Decompressed in {:.3}s", self.decompress_secs);
        println!("Original     sha256 {}", self.original_sha256);
        println!("Round-trip   sha256 {}", self.roundtrip_sha256);
        println!(
            "Result       {}",
            if self.identical { "identical" } else { "NOT identical" }
        );
    }
}

pub fn cmd_bench(
    input: &Path,
    precision: Precision,
    force: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = precision.codec();
    let compressed = compressed_path(input, codec.extension());
    let decompressed = decompressed_path(&compressed, codec.extension());
    check_output(&compressed, force)?;
    check_output(&decompressed, force)?;

    let original_size = std::fs::metadata(input)?.len();

    let start = Instant::now();
    let compressed_size = codec.compress_file_to(input, &compressed)?;
    let compress_secs = start.elapsed().as_secs_f64();

    let start = Instant::now();
    codec.decompress_file_to(&compressed, &decompressed)?;
    let decompress_secs = start.elapsed().as_secs_f64();

    let original_sha256 = sha256_file(input)?;
    let roundtrip_sha256 = sha256_file(&decompressed)?;

    let report = BenchReport {
        input: input.display().to_string(),
        compressed: compressed.display().to_string(),
        decompressed: decompressed.display().to_string(),
        state_bits: precision.bits(),
        original_size,
        compressed_size,
        ratio: compression_ratio(original_size, compressed_size),
        compress_secs,
        decompress_secs,
        identical: original_sha256 == roundtrip_sha256,
        original_sha256,
        roundtrip_sha256,
    };
    tracing::debug!(?report, "benchmark finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }

    if !report.identical {
        return Err(
            SquashError::digest_mismatch(report.original_sha256, report.roundtrip_sha256).into(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_bench_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sample.txt");
        fs::write(&input, b"bench me, bench me again".repeat(50)).unwrap();

        cmd_bench(&input, Precision::Bits32, false, true).unwrap();

        assert!(dir.path().join("sample.txt.AE").exists());
        assert_eq!(
            fs::read(dir.path().join("decompressed_sample.txt")).unwrap(),
            fs::read(&input).unwrap()
        );
    }

    #[test]
    fn test_bench_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sample.txt");
        fs::write(&input, b"data").unwrap();
        fs::write(dir.path().join("sample.txt.AE"), b"stale").unwrap();

        assert!(cmd_bench(&input, Precision::Bits32, false, true).is_err());
        assert!(cmd_bench(&input, Precision::Bits32, true, true).is_ok());
    }
}
