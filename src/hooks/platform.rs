//! Host-specific variable expansion and shell invocation.
//!
//! POSIX hosts expand `$VAR` / `${VAR}` and run commands with `sh -c`;
//! Windows hosts expand `%VAR%` and run commands with `cmd.exe /C`. The
//! implementation is picked at build time by [`host`].

use regex::{Captures, Regex};
use std::process::Command;
use std::sync::LazyLock;

use super::context::CommandContext;

static POSIX_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("Invalid regex pattern")
});

static WINDOWS_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z_][A-Za-z0-9_()]*)%").expect("Invalid regex pattern"));

/// Platform conventions for hook commands.
pub trait Platform: Send + Sync {
    /// Expand variable references in `text` using the context environment.
    fn expand(&self, text: &str, ctx: &CommandContext) -> String;

    /// Build the shell invocation for `command`.
    fn shell(&self, command: &str) -> Command;
}

/// `sh -c` with `$VAR` expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Posix;

/// `cmd.exe /C` with `%VAR%` expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Windows;

impl Platform for Posix {
    fn expand(&self, text: &str, ctx: &CommandContext) -> String {
        expand_posix(text, |name| ctx.var(name).map(str::to_string))
    }

    fn shell(&self, command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

impl Platform for Windows {
    fn expand(&self, text: &str, ctx: &CommandContext) -> String {
        expand_windows(text, |name| {
            // Windows variable names are case-insensitive
            ctx.var(name)
                .or_else(|| {
                    ctx.env_vars()
                        .into_iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(name))
                        .map(|(_, v)| v)
                })
                .map(str::to_string)
        })
    }

    fn shell(&self, command: &str) -> Command {
        let mut cmd = Command::new("cmd.exe");
        cmd.arg("/C");
        // cmd.exe parses its own command line; quoting it again breaks embedded quotes
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.raw_arg(command);
        }
        #[cfg(not(windows))]
        cmd.arg(command);
        cmd
    }
}

/// Platform of the host this binary was built for.
#[cfg(windows)]
pub fn host() -> &'static dyn Platform {
    &Windows
}

/// Platform of the host this binary was built for.
#[cfg(not(windows))]
pub fn host() -> &'static dyn Platform {
    &Posix
}

/// Expand `${VAR}` and `$VAR`. Undefined variables are kept as written.
pub fn expand_posix(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    POSIX_VAR
        .replace_all(text, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            name.and_then(&lookup)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Expand `%VAR%`. Undefined variables are kept as written.
pub fn expand_windows(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    WINDOWS_VAR
        .replace_all(text, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
