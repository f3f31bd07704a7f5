use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::i18n::Localizer;

/// Category of a failure recorded during a backup session.
///
/// The same taxonomy is used for all three phases (pre-hooks, transfers,
/// post-hooks). Every variant is recoverable at phase level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Generic,
    /// The command text could not be interpreted (bad builtin arguments)
    CommandInvalid,
    /// The command ran and exited with a non-zero status
    CommandFailed,
    /// A configured path could not be resolved on the local filesystem
    PathError,
    UploadError,
    DownloadError,
}

impl ErrorKind {
    /// Message id of the per-kind localization template.
    pub fn message_id(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "ErrorGeneric",
            ErrorKind::CommandInvalid => "ErrorCmdInvalid",
            ErrorKind::CommandFailed => "ErrorCmdFailed",
            ErrorKind::PathError => "ErrorPath",
            ErrorKind::UploadError => "ErrorUpload",
            ErrorKind::DownloadError => "ErrorDownload",
        }
    }

    /// Build an error of this kind.
    pub fn error(self, source: impl Into<String>, message: impl Into<String>) -> BackupError {
        BackupError {
            kind: self,
            source: source.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Generic => write!(f, "error"),
            ErrorKind::CommandInvalid => write!(f, "invalid command"),
            ErrorKind::CommandFailed => write!(f, "command failed"),
            ErrorKind::PathError => write!(f, "path error"),
            ErrorKind::UploadError => write!(f, "upload failed"),
            ErrorKind::DownloadError => write!(f, "download failed"),
        }
    }
}

/// A single failure: what went wrong, on which path or command, and why.
///
/// Carries no cause chain; the underlying error is flattened into `message`
/// when the failure is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupError {
    pub kind: ErrorKind,
    /// Path or command string the failure refers to
    pub source: String,
    pub message: String,
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.kind, self.source, self.message)
    }
}

// `source` is a plain string, not a cause, so `Error::source` stays `None`.
impl std::error::Error for BackupError {}

impl BackupError {
    /// Render this error through its per-kind template.
    pub fn localize(&self, localizer: &Localizer, languages: &[String]) -> String {
        let vars = HashMap::from([
            ("Source", self.source.as_str()),
            ("Message", self.message.as_str()),
        ]);
        localizer.localize_template(self.kind.message_id(), &vars, languages)
    }
}
