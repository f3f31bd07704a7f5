//! Pre/post hook interpreter.
//!
//! A hook batch is an ordered list of command lines. Each line may chain
//! several sub-commands with `&`; they run one after the other and a failing
//! sub-command never stops the rest of the batch. `cd`, `export` and `sleep`
//! are handled in-process (see [`Builtins`]) so that directory and variable
//! changes carry over to the following commands of the same batch. Anything
//! else is run by the host shell.
//!
//! Every call to [`Interpreter::run_batch`] starts from the process's own
//! directory and environment.

mod builtins;
mod context;
mod executor;
mod platform;

pub use builtins::{BuiltinFn, Builtins};
pub use context::CommandContext;
pub use executor::{run_shell, ShellOutput};
pub use platform::{expand_posix, expand_windows, host, Platform, Posix, Windows};

use std::thread;
use std::time::Duration;

use crate::models::ErrorKind;
use crate::report::{error_channel, ErrorSender, ErrorStream};

/// Pause after each top-level command
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Delay after each top-level command
    pub pacing: Duration,
    /// Kill shell commands that run longer than this
    pub timeout: Option<Duration>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            timeout: None,
        }
    }
}

pub struct Interpreter {
    builtins: Builtins,
    platform: &'static dyn Platform,
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            builtins: Builtins::standard(),
            platform: host(),
            config,
        }
    }

    /// Replace the table of in-process verbs.
    pub fn with_builtins(mut self, builtins: Builtins) -> Self {
        self.builtins = builtins;
        self
    }

    /// Run `commands` in order and return the closed stream of failures,
    /// with one slot per top-level command.
    pub fn run_batch(&self, commands: &[String], surface_output: bool) -> ErrorStream {
        let (errors, stream) = error_channel(commands.len());
        self.run_into(commands, surface_output, &errors);
        stream
    }

    /// Run `commands` in order, recording failures into `errors`.
    pub fn run_into(&self, commands: &[String], surface_output: bool, errors: &ErrorSender) {
        let mut ctx = CommandContext::from_process();

        for (n, command) in commands.iter().enumerate() {
            tracing::info!("{}° Running '{}'", n + 1, command);
            for sub in split_commands(command) {
                self.run_one(n + 1, sub, &mut ctx, surface_output, errors);
            }
            if !self.config.pacing.is_zero() {
                thread::sleep(self.config.pacing);
            }
        }
    }

    fn run_one(
        &self,
        n: usize,
        command: &str,
        ctx: &mut CommandContext,
        surface_output: bool,
        errors: &ErrorSender,
    ) {
        let expanded = self.platform.expand(command, ctx);
        let (verb, args) = match expanded.split_once(char::is_whitespace) {
            Some((verb, args)) => (verb, args.trim()),
            None => (expanded.as_str(), ""),
        };

        if let Some(builtin) = self.builtins.get(verb) {
            if let Err(e) = builtin(args, ctx) {
                tracing::error!("{n}° Invalid command '{command}': {e:#}");
                errors.send(ErrorKind::CommandInvalid.error(command, format!("{e:#}")));
            }
            return;
        }

        let output = match run_shell(self.platform, &expanded, ctx, self.config.timeout) {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("{n}° Command error '{command}': {e:#}");
                errors.send(ErrorKind::CommandFailed.error(command, format!("{e:#}")));
                return;
            }
        };

        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            tracing::warn!("{n}° stderr of '{command}':\n{stderr}");
        }
        let stdout = output.stdout.trim();
        if surface_output && !stdout.is_empty() {
            tracing::info!("{n}° output of '{command}':\n{stdout}");
        }

        if !output.success {
            tracing::error!("{n}° Command error '{command}'");
            let message = if stderr.is_empty() {
                match output.exit_code {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated".to_string(),
                }
            } else {
                stderr.to_string()
            };
            errors.send(ErrorKind::CommandFailed.error(command, message));
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterConfig::default())
    }
}

/// Split a command line on `&` into trimmed, non-empty sub-commands.
///
/// An `&` that belongs to a redirection (`2>&1`, `&>file`, `<&3`) is not a
/// separator. `&&` yields an empty piece and so acts like `&`.
pub fn split_commands(command: &str) -> Vec<&str> {
    let bytes = command.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'&' {
            continue;
        }
        let prev = i.checked_sub(1).map(|j| bytes[j]);
        let next = bytes.get(i + 1).copied();
        if matches!(prev, Some(b'>' | b'<')) || next == Some(b'>') {
            continue;
        }
        parts.push(&command[start..i]);
        start = i + 1;
    }
    parts.push(&command[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
