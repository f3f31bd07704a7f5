//! Filesystem-backed provider: remotes are directories on a mounted volume.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::provider::{ProviderError, ProviderResult, TransferProvider};
use super::remote_path::is_local_root;

/// Provider whose remotes are local directories (NAS mounts, USB disks).
///
/// `name:rel/path` resolves to `<remotes[name]>/rel/path`; absolute paths
/// are used as they are.
#[derive(Debug, Clone, Default)]
pub struct LocalProvider {
    remotes: BTreeMap<String, PathBuf>,
}

impl LocalProvider {
    pub fn new(remotes: BTreeMap<String, PathBuf>) -> Self {
        Self { remotes }
    }

    pub fn resolve(&self, locator: &str) -> ProviderResult<PathBuf> {
        if is_local_root(locator) {
            return Ok(PathBuf::from(locator));
        }
        let (name, rel) = locator
            .split_once(':')
            .ok_or_else(|| ProviderError::InvalidLocator(locator.to_string()))?;
        let root = self
            .remotes
            .get(name)
            .ok_or_else(|| ProviderError::InvalidLocator(locator.to_string()))?;

        let rel = rel.trim_start_matches(['/', '\\']);
        Ok(if rel.is_empty() {
            root.clone()
        } else {
            root.join(rel)
        })
    }
}

impl TransferProvider for LocalProvider {
    type Handle = PathBuf;

    fn open_filesystem(&self, locator: &str) -> ProviderResult<PathBuf> {
        self.resolve(locator)
    }

    fn list(&self, handle: &PathBuf) -> ProviderResult<Vec<String>> {
        let entries = fs::read_dir(handle).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProviderError::DirNotFound(handle.display().to_string()),
            _ => io_error(handle, e),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(handle, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn make_dir(&self, handle: &PathBuf) -> ProviderResult<()> {
        fs::create_dir_all(handle).map_err(|e| io_error(handle, e))
    }

    fn copy_file(
        &self,
        dest: &PathBuf,
        src: &PathBuf,
        src_name: &str,
        dest_name: &str,
    ) -> ProviderResult<()> {
        let from = src.join(src_name);
        if !from.is_file() {
            return Err(ProviderError::NotFound(from.display().to_string()));
        }
        let to = dest.join(dest_name);
        fs::copy(&from, &to).map_err(|e| io_error(&to, e))?;
        Ok(())
    }

    fn copy_dir(&self, dest: &PathBuf, src: &PathBuf, include_empty_dirs: bool) -> ProviderResult<()> {
        if !src.is_dir() {
            return Err(ProviderError::DirNotFound(src.display().to_string()));
        }
        copy_tree(src, dest, include_empty_dirs)
    }
}

fn copy_tree(src: &Path, dest: &Path, include_empty_dirs: bool) -> ProviderResult<()> {
    if include_empty_dirs {
        fs::create_dir_all(dest).map_err(|e| io_error(dest, e))?;
    }

    for entry in fs::read_dir(src).map_err(|e| io_error(src, e))? {
        let entry = entry.map_err(|e| io_error(src, e))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());

        if from.is_dir() {
            copy_tree(&from, &to, include_empty_dirs)?;
        } else {
            fs::create_dir_all(dest).map_err(|e| io_error(dest, e))?;
            fs::copy(&from, &to).map_err(|e| io_error(&to, e))?;
        }
    }
    Ok(())
}

fn io_error(path: &Path, source: io::Error) -> ProviderError {
    ProviderError::Io {
        path: path.display().to_string(),
        source,
    }
}
