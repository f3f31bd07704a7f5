use thiserror::Error;

/// Failure reported by a [`TransferProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Listing a directory that does not exist. Callers create it and retry.
    #[error("directory not found: {0}")]
    DirNotFound(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid locator '{0}'")]
    InvalidLocator(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Storage backend that moves bytes between filesystems.
///
/// A locator is either an absolute local path or `remote:relative/path`.
/// All calls are blocking and are made concurrently from the transfer
/// tasks of a session.
pub trait TransferProvider: Send + Sync {
    type Handle: Send;

    fn open_filesystem(&self, locator: &str) -> ProviderResult<Self::Handle>;

    /// Entry names of the directory behind `handle`.
    fn list(&self, handle: &Self::Handle) -> ProviderResult<Vec<String>>;

    fn make_dir(&self, handle: &Self::Handle) -> ProviderResult<()>;

    fn copy_file(
        &self,
        dest: &Self::Handle,
        src: &Self::Handle,
        src_name: &str,
        dest_name: &str,
    ) -> ProviderResult<()>;

    /// Recursively copy the content of `src` into `dest`.
    fn copy_dir(
        &self,
        dest: &Self::Handle,
        src: &Self::Handle,
        include_empty_dirs: bool,
    ) -> ProviderResult<()>;
}
