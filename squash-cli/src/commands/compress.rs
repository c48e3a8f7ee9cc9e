//! Compress command implementation.

use super::Precision;
use crate::utils::{check_output, compression_ratio, create_spinner, format_size};
use squash_core::paths::compressed_path;
use std::path::Path;

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    precision: Precision,
    force: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = precision.codec();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| compressed_path(input, codec.extension()));
    check_output(&output, force)?;

    let original = std::fs::metadata(input)?.len();
    let spinner = create_spinner(format!("Compressing {}", input.display()), progress);
    let result = codec.compress_file_to(input, &output);
    spinner.finish_and_clear();
    let compressed = result?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        original,
        compressed,
        bits = precision.bits(),
        "compressed file"
    );
    println!(
        "{} -> {} ({} -> {}, ratio {:.3})",
        input.display(),
        output.display(),
        format_size(original),
        format_size(compressed),
        compression_ratio(original, compressed)
    );
    Ok(())
}
