//! Naming conventions shared by packaging and build orchestration.

use crate::error::{PackError, PackResult};

/// Extension of patch archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Patch name for `revision`, built on top of build `prev_build` and
/// produced by build `build`: `"{revision}_{prev_build}_{build}"`.
pub fn patch_name(revision: u16, prev_build: u32, build: u32) -> String {
    format!("{revision}_{prev_build}_{build}")
}

/// File name of the archive for `name`.
pub fn archive_file_name(name: &str) -> String {
    format!("{name}.{ARCHIVE_EXTENSION}")
}

/// Extract the build number from a build directory name `"<timestamp>(<n>)"`.
///
/// The number is the text between the last `(` and the trailing `)`.
pub fn parse_build_number(dir_name: &str) -> PackResult<u32> {
    let invalid = || PackError::InvalidBuildDirectory(dir_name.to_string());
    let inner = dir_name.strip_suffix(')').ok_or_else(invalid)?;
    let (_, number) = inner.rsplit_once('(').ok_or_else(invalid)?;
    number.trim().parse().map_err(|_| invalid())
}

/// Build directory name for a timestamp and build number.
pub fn build_dir_name(timestamp: &str, build: u32) -> String {
    format!("{timestamp}({build})")
}
