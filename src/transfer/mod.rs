//! Path transfers between the machine and the remote.
//!
//! [`Dispatcher`] fans a session's paths out to one task each and collects
//! their failures; the bytes are moved by a [`TransferProvider`].

mod dispatcher;
mod fault;
mod local;
mod provider;
mod remote_path;

pub use dispatcher::{Dispatcher, ProcessedPaths, RemoteTarget};
pub use fault::{gibberish, FaultInjector, DEFAULT_FAULT_RATE};
pub use local::LocalProvider;
pub use provider::{ProviderError, ProviderResult, TransferProvider};
pub use remote_path::{is_local_root, locator, remote_path, sanitize};
