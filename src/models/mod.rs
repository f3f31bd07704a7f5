pub mod error;
pub mod machine;
pub mod options;

pub use error::{BackupError, ErrorKind};
pub use machine::MachineProfile;
pub use options::{Direction, Options, OptionsBuilder};
