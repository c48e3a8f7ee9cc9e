//! Output path derivation for file-level codec operations.
//!
//! Compressed files keep the full original name and gain the codec
//! extension (`lorem.txt` becomes `lorem.txt.AE`). Decompression strips that
//! extension again and prefixes the name with `decompressed_` so the
//! round-tripped file never overwrites the original.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Prefix given to decompressed file names.
pub const DECOMPRESSED_PREFIX: &str = "decompressed_";

/// Path of the compressed file for `input`.
pub fn compressed_path(input: &Path, extension: &str) -> PathBuf {
    let mut name = input
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(extension);
    input.with_file_name(name)
}

/// Path of the decompressed file for the compressed `input`.
///
/// If `input` does not carry `extension`, the prefix is applied to the
/// whole file name.
pub fn decompressed_path(input: &Path, extension: &str) -> PathBuf {
    let stem = match (input.extension(), input.file_stem()) {
        (Some(ext), Some(stem)) if ext == OsStr::new(extension) => stem,
        _ => input.file_name().unwrap_or_default(),
    };

    let mut name = OsString::from(DECOMPRESSED_PREFIX);
    name.push(stem);
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_path() {
        assert_eq!(
            compressed_path(Path::new("lorem.txt"), "AE"),
            PathBuf::from("lorem.txt.AE")
        );
        assert_eq!(
            compressed_path(Path::new("/data/archive"), "AE"),
            PathBuf::from("/data/archive.AE")
        );
    }

    #[test]
    fn test_decompressed_path() {
        assert_eq!(
            decompressed_path(Path::new("lorem.txt.AE"), "AE"),
            PathBuf::from("decompressed_lorem.txt")
        );
        assert_eq!(
            decompressed_path(Path::new("/data/archive.AE"), "AE"),
            PathBuf::from("/data/decompressed_archive")
        );
    }

    #[test]
    fn test_decompressed_path_without_extension() {
        assert_eq!(
            decompressed_path(Path::new("blob.bin"), "AE"),
            PathBuf::from("decompressed_blob.bin")
        );
        // A bare ".AE" keeps its name rather than collapsing to the prefix.
        assert_eq!(
            decompressed_path(Path::new(".AE"), "AE"),
            PathBuf::from("decompressed_.AE")
        );
    }

    #[test]
    fn test_paths_compose() {
        let original = Path::new("dir/report.csv");
        let compressed = compressed_path(original, "AE");
        assert_eq!(
            decompressed_path(&compressed, "AE"),
            PathBuf::from("dir/decompressed_report.csv")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_decompressed_path_keeps_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new("dir").join(OsStr::from_bytes(b"caf\xe9.txt.AE"));
        let output = decompressed_path(&input, "AE");
        assert_eq!(
            output,
            Path::new("dir").join(OsStr::from_bytes(b"decompressed_caf\xe9.txt"))
        );
        assert_eq!(
            compressed_path(&output, "AE"),
            Path::new("dir").join(OsStr::from_bytes(b"decompressed_caf\xe9.txt.AE"))
        );
    }
}
