use std::env;
use std::fmt;

use super::error::ErrorKind;

/// Default directory on the remote under which every host gets a folder.
pub const DEFAULT_REMOTE_ROOT: &str = "Backups";

/// Direction of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Upload,
    Download,
}

impl Direction {
    /// Kind recorded when a transfer in this direction fails.
    pub fn transfer_error_kind(&self) -> ErrorKind {
        match self {
            Direction::Upload => ErrorKind::UploadError,
            Direction::Download => ErrorKind::DownloadError,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upload => write!(f, "upload"),
            Direction::Download => write!(f, "download"),
        }
    }
}

/// Session options. Immutable once built; construct with [`Options::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    remote: String,
    remote_root: String,
    direction: Direction,
    simulate: bool,
    interactive: bool,
    debug: bool,
    languages: Vec<String>,
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Resolved remote name, or an absolute path for the local backend.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn remote_root(&self) -> &str {
        &self.remote_root
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn simulate(&self) -> bool {
        self.simulate
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Preferred languages, most preferred first.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

/// Builder for [`Options`].
///
/// Setters that receive an empty value keep the default, so CLI flags can be
/// forwarded without pre-filtering.
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    options: Options,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            options: Options {
                remote: String::new(),
                remote_root: DEFAULT_REMOTE_ROOT.to_string(),
                direction: Direction::Upload,
                simulate: false,
                interactive: true,
                debug: false,
                languages: system_languages(),
            },
        }
    }
}

impl OptionsBuilder {
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        let remote = remote.into();
        if !remote.is_empty() {
            self.options.remote = remote;
        }
        self
    }

    pub fn remote_root(mut self, root: impl Into<String>) -> Self {
        let root = root.into();
        if !root.is_empty() {
            self.options.remote_root = root;
        }
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.options.direction = direction;
        self
    }

    pub fn simulate(mut self, simulate: bool) -> Self {
        self.options.simulate = simulate;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.options.interactive = interactive;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let languages: Vec<String> = languages
            .into_iter()
            .map(Into::into)
            .filter(|l| !l.is_empty())
            .collect();
        if !languages.is_empty() {
            self.options.languages = languages;
        }
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

/// Languages derived from `LANG` / `LC_MESSAGES`, always ending with `en`.
///
/// `it_IT.UTF-8` yields `["it", "en"]`; an unset locale yields `["en"]`.
pub fn system_languages() -> Vec<String> {
    let locale = env::var("LANG")
        .ok()
        .filter(|l| !l.is_empty())
        .or_else(|| env::var("LC_MESSAGES").ok())
        .unwrap_or_default();
    languages_from_locale(&locale)
}

fn languages_from_locale(locale: &str) -> Vec<String> {
    let mut languages = Vec::new();
    let primary = locale
        .split(['_', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if !primary.is_empty() && primary != "c" && primary != "posix" && primary != "en" {
        languages.push(primary);
    }
    languages.push("en".to_string());
    languages
}
