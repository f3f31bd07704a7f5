//! Config file, environment file and remote selection.

pub mod env_file;
pub mod remote;
pub mod store;

pub use env_file::{load_env_file, DEFAULT_ENV_FILE};
pub use store::{clean_path, ConfigFile, ConfigStore, CONFIG_FILE_NAME};
