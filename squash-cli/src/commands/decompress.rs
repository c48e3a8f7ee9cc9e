//! Decompress command implementation.

use super::Precision;
use crate::utils::{check_output, create_spinner, format_size};
use squash_core::paths::decompressed_path;
use std::path::Path;

pub fn cmd_decompress(
    input: &Path,
    output: Option<&Path>,
    precision: Precision,
    force: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = precision.codec();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| decompressed_path(input, codec.extension()));
    check_output(&output, force)?;

    let spinner = create_spinner(format!("Decompressing {}", input.display()), progress);
    let result = codec.decompress_file_to(input, &output);
    spinner.finish_and_clear();
    let written = result?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        bytes = written,
        "decompressed file"
    );
    println!(
        "{} -> {} ({})",
        input.display(),
        output.display(),
        format_size(written)
    );
    Ok(())
}
