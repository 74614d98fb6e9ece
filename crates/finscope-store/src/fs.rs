use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Prefix used by in-flight temp files. Directory scans skip these.
pub const TEMP_PREFIX: &str = ".tmp";

/// Atomic write: write to a temp file in the same dir, fsync, then rename
/// over `path`. Readers see either the old content or the new, never a mix.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no parent dir for {}", path.display()),
        )
    })?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
