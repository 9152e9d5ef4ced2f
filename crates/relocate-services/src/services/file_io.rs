//! Reading candidate files and writing rewritten ones

use relocate_foundation::{RelocateError, RelocateResult};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Bytes inspected when sniffing for binary content
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Whether `bytes` look like binary data: a NUL byte near the start
pub fn looks_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    head.contains(&0)
}

/// Read `path` as UTF-8 text.
///
/// Binary and non UTF-8 files come back as `None` and are skipped silently.
pub async fn read_text(path: &Path) -> RelocateResult<Option<String>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| RelocateError::io(path, e))?;

    if looks_binary(&bytes) {
        debug!(file = %path.display(), "Skipping binary file");
        return Ok(None);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(_) => {
            debug!(file = %path.display(), "Skipping binary file");
            Ok(None)
        }
    }
}

/// Replace the contents of `path` without ever leaving it half written.
///
/// The new content goes to a temporary file in the same directory which is
/// then renamed over the original. Permissions of the original are kept.
pub fn write_atomic(path: &Path, content: &str) -> RelocateResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| RelocateError::io_message(path, "File has no parent directory"))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| RelocateError::io(path, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| RelocateError::io(path, e))?;

    if let Ok(metadata) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| RelocateError::io(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| RelocateError::io(path, e.error))?;
    Ok(())
}
