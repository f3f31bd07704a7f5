pub mod commands;
pub mod config;
pub mod fs;
pub mod hooks;
pub mod i18n;
pub mod logging;
pub mod models;
pub mod notify;
pub mod report;
pub mod session;
pub mod transfer;
