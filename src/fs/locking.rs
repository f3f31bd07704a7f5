//! Advisory-locked file access.
//!
//! The config file can be touched by two `haul` runs at once (a scheduled
//! unattended backup and a manual one). Readers take a shared `fs2` lock,
//! writers an exclusive one, so a reader never sees a half-written file.

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

/// Read the whole file under a shared lock.
pub fn locked_read(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    file.lock_shared()
        .with_context(|| format!("Failed to lock {}", path.display()))?;

    let mut content = String::new();
    (&file)
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content)
}

/// Replace the file content under an exclusive lock, creating the file and
/// its parent directories if needed.
///
/// The file is truncated only once the lock is held.
pub fn locked_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    #[allow(clippy::suspicious_open_options)]
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to lock {}", path.display()))?;
    file.set_len(0)
        .with_context(|| format!("Failed to truncate {}", path.display()))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Parse a JSON file read under a shared lock.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = locked_read(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Write `value` as pretty-printed JSON under an exclusive lock.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    content.push('\n');
    locked_write(path, &content)
}
