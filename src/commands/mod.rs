pub mod backup;
pub mod completions;
pub mod config;
