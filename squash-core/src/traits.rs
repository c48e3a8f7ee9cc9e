//! The codec contract shared by every compression algorithm.
//!
//! A codec turns a whole byte sequence into a self-describing compressed
//! sequence and back. The file-level methods derive output paths with
//! [`crate::paths`] and never leave a partially written output behind.

use crate::error::Result;
use crate::paths;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A one-shot lossless codec.
///
/// Implementors provide the in-memory transform; the file-level methods
/// have default implementations that buffer the whole file. Codecs that can
/// stream override [`Codec::compress_file_to`] and
/// [`Codec::decompress_file_to`].
pub trait Codec {
    /// Human-readable algorithm name.
    fn name(&self) -> &'static str;

    /// Extension appended to compressed files (without the dot).
    fn extension(&self) -> &'static str;

    /// Compress a complete input.
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a complete input produced by [`Codec::compress`].
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Compress `input` into `output`.
    fn compress_file_to(&self, input: &Path, output: &Path) -> Result<u64> {
        let data = fs::read(input)?;
        let compressed = self.compress(&data)?;
        write_output(output, |writer| Ok(writer.write_all(&compressed)?))?;
        Ok(compressed.len() as u64)
    }

    /// Decompress `input` into `output`.
    fn decompress_file_to(&self, input: &Path, output: &Path) -> Result<u64> {
        let data = fs::read(input)?;
        let decompressed = self.decompress(&data)?;
        write_output(output, |writer| Ok(writer.write_all(&decompressed)?))?;
        Ok(decompressed.len() as u64)
    }

    /// Compress a file next to itself and return the output path.
    fn compress_file(&self, input: &Path) -> Result<PathBuf> {
        let output = paths::compressed_path(input, self.extension());
        self.compress_file_to(input, &output)?;
        Ok(output)
    }

    /// Decompress a file next to itself and return the output path.
    fn decompress_file(&self, input: &Path) -> Result<PathBuf> {
        let output = paths::decompressed_path(input, self.extension());
        self.decompress_file_to(input, &output)?;
        Ok(output)
    }
}

/// Create `path`, hand a buffered writer to `f`, and flush it.
///
/// If `f` or the final flush fails, the file is removed so no partial
/// output survives the failed operation.
pub fn write_output<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = f(&mut writer).and_then(|value| {
        writer.flush()?;
        Ok(value)
    });

    if let Err(e) = &result {
        tracing::debug!(path = %path.display(), error = %e, "removing partial output");
        drop(writer);
        let _ = fs::remove_file(path);
    }
    result
}
