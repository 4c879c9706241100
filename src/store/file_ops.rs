// src/store/file_ops.rs
//! Crash-safe file writes
//!
//! Full rewrites go to a temp file in the same directory which is then
//! renamed over the original, so the previous content stays intact until the
//! new one is complete. Appends are rolled back by truncation on failure.

use std::fs::OpenOptions;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

/// Write a complete replacement of `path`; the original survives any error
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".totp-store-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path)?;
    sync_dir(dir);

    debug!(path = %path.display(), "rewrite committed");
    Ok(())
}

/// Append `bytes` at EOF; on failure the file is truncated back
pub(crate) fn append_with_rollback(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().read(true).append(true).open(path)?;
    let original_len = file.metadata()?.len();

    let mut payload = Vec::with_capacity(bytes.len() + 1);
    if original_len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            payload.push(b'\n');
        }
    }
    payload.extend_from_slice(bytes);

    if let Err(err) = file.write_all(&payload).and_then(|_| file.sync_all()) {
        warn!(path = %path.display(), %err, "append failed, truncating back");
        if let Err(truncate_err) = file.set_len(original_len) {
            warn!(path = %path.display(), %truncate_err, "rollback truncation failed");
        }
        return Err(err.into());
    }
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    // rename durability; failure here leaves a committed but unsynced entry
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
