//! Concurrent per-path transfer dispatch.

use std::collections::HashSet;
use std::fs;
use std::path::{self, Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use super::fault::FaultInjector;
use super::provider::{ProviderError, ProviderResult, TransferProvider};
use super::remote_path::remote_path;
use crate::models::{Direction, ErrorKind};
use crate::report::{error_channel, ErrorSender, ErrorStream};

/// Where a session's paths go: `<remote>:<root>/<hostname>/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub remote: String,
    pub root: String,
    pub hostname: String,
}

impl RemoteTarget {
    pub fn new(
        remote: impl Into<String>,
        root: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            remote: remote.into(),
            root: root.into(),
            hostname: hostname.into(),
        }
    }

    /// Remote locator mirroring the local directory `local_dir`.
    pub fn locator_for(&self, local_dir: &str) -> String {
        remote_path(&self.remote, &self.root, &self.hostname, local_dir)
    }
}

/// Paths already handled in this session.
#[derive(Debug, Default)]
pub struct ProcessedPaths {
    seen: Mutex<HashSet<String>>,
}

impl ProcessedPaths {
    /// Mark `path` as processed. False if it already was.
    pub fn claim(&self, path: &str) -> bool {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.insert(path.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs one transfer task per configured path.
pub struct Dispatcher<P: TransferProvider> {
    provider: P,
    target: RemoteTarget,
    faults: FaultInjector,
    processed: ProcessedPaths,
}

impl<P: TransferProvider> Dispatcher<P> {
    pub fn new(provider: P, target: RemoteTarget) -> Self {
        Self {
            provider,
            target,
            faults: FaultInjector::default(),
            processed: ProcessedPaths::default(),
        }
    }

    pub fn with_faults(mut self, faults: FaultInjector) -> Self {
        self.faults = faults;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    pub fn processed(&self) -> &ProcessedPaths {
        &self.processed
    }

    /// Transfer every path concurrently and return once all are done.
    ///
    /// The stream has one slot per entry of `paths`. A path listed twice is
    /// transferred once; the duplicate is not a failure.
    pub fn dispatch(&self, paths: &[String], direction: Direction, simulate: bool) -> ErrorStream {
        let (errors, stream) = error_channel(paths.len());

        thread::scope(|scope| {
            for path in paths {
                let errors = errors.clone();
                scope.spawn(move || self.transfer(path, direction, simulate, &errors));
            }
        });

        stream
    }

    fn transfer(&self, path: &str, direction: Direction, simulate: bool, errors: &ErrorSender) {
        if !self.processed.claim(path) {
            tracing::info!("Skipping '{path}': already processed");
            return;
        }

        let absolute = match path::absolute(path) {
            Ok(absolute) => absolute,
            Err(e) => {
                tracing::error!("Cannot resolve '{path}': {e}");
                errors.send(ErrorKind::PathError.error(path, e.to_string()));
                return;
            }
        };
        let metadata = match fs::metadata(&absolute) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::error!("Cannot stat '{}': {e}", absolute.display());
                errors.send(ErrorKind::PathError.error(path, e.to_string()));
                return;
            }
        };

        if simulate {
            if let Some(fault) = self.faults.inject(path, direction) {
                tracing::warn!("Simulated failure: {fault}");
                errors.send(fault);
                return;
            }
        }

        let (local_dir, file_name) = if metadata.is_dir() {
            (absolute, None)
        } else {
            let name = absolute
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let parent = absolute
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            (parent, name)
        };
        let local = local_dir.display().to_string();
        let remote = self.target.locator_for(&local);

        let (src, dest) = match direction {
            Direction::Upload => (local.as_str(), remote.as_str()),
            Direction::Download => (remote.as_str(), local.as_str()),
        };
        tracing::info!("{direction}: '{src}' -> '{dest}'");

        if let Err(e) = self.copy(src, dest, file_name.as_deref(), simulate) {
            tracing::error!("Transfer of '{path}' failed: {e}");
            errors.send(direction.transfer_error_kind().error(path, e.to_string()));
        }
    }

    fn copy(
        &self,
        src: &str,
        dest: &str,
        file_name: Option<&str>,
        simulate: bool,
    ) -> ProviderResult<()> {
        let dest_handle = self.provider.open_filesystem(dest)?;
        let src_handle = self.provider.open_filesystem(src)?;
        self.ensure_dir(&dest_handle)?;

        if simulate {
            tracing::info!("Simulate: would copy '{src}' to '{dest}'");
            return Ok(());
        }

        match file_name {
            Some(name) => self
                .provider
                .copy_file(&dest_handle, &src_handle, name, name),
            None => self.provider.copy_dir(&dest_handle, &src_handle, true),
        }
    }

    /// Create the directory behind `handle` if listing says it is missing.
    fn ensure_dir(&self, handle: &P::Handle) -> ProviderResult<()> {
        match self.provider.list(handle) {
            Ok(_) => Ok(()),
            Err(ProviderError::DirNotFound(dir)) => {
                tracing::debug!("Creating '{dir}'");
                self.provider.make_dir(handle)
            }
            Err(e) => Err(e),
        }
    }
}
