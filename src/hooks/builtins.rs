//! Verbs handled in-process instead of by the shell.
//!
//! Builtins exist for the commands whose effect must outlive a single shell
//! invocation: changing directory and exporting variables only make sense
//! when they mutate the batch's [`CommandContext`].

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::context::CommandContext;

/// A builtin receives the (already expanded) text after its verb.
pub type BuiltinFn = Box<dyn Fn(&str, &mut CommandContext) -> Result<()> + Send + Sync>;

/// Dispatch table from leading verb to builtin.
pub struct Builtins {
    table: HashMap<String, BuiltinFn>,
}

impl Builtins {
    /// Table without any verb; every command goes to the shell.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// `sleep`, `cd` and `export`.
    pub fn standard() -> Self {
        let mut builtins = Self::empty();
        builtins.register("sleep", sleep);
        builtins.register("cd", change_dir);
        builtins.register("export", export);
        builtins
    }

    /// Add or replace the handler for `verb`.
    pub fn register<F>(&mut self, verb: &str, handler: F)
    where
        F: Fn(&str, &mut CommandContext) -> Result<()> + Send + Sync + 'static,
    {
        self.table.insert(verb.to_string(), Box::new(handler));
    }

    pub fn get(&self, verb: &str) -> Option<&BuiltinFn> {
        self.table.get(verb)
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.table.contains_key(verb)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Builtins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut verbs: Vec<_> = self.table.keys().collect();
        verbs.sort();
        f.debug_struct("Builtins").field("verbs", &verbs).finish()
    }
}

fn sleep(args: &str, _ctx: &mut CommandContext) -> Result<()> {
    let seconds: u64 = args
        .trim()
        .parse()
        .with_context(|| format!("invalid number of seconds '{}'", args.trim()))?;
    tracing::debug!("Sleeping {seconds}s");
    thread::sleep(Duration::from_secs(seconds));
    Ok(())
}

fn change_dir(args: &str, ctx: &mut CommandContext) -> Result<()> {
    let raw = unquote(args.trim());
    if raw.is_empty() {
        bail!("missing directory");
    }

    let expanded = expand_tilde(raw, ctx);
    let candidate = if expanded.is_absolute() {
        expanded
    } else {
        ctx.cwd().join(expanded)
    };

    let resolved = candidate
        .canonicalize()
        .with_context(|| format!("directory '{}' does not exist", candidate.display()))?;
    if !resolved.is_dir() {
        bail!("'{}' is not a directory", resolved.display());
    }

    tracing::debug!("Changing directory to {}", resolved.display());
    ctx.set_cwd(resolved);
    Ok(())
}

fn export(args: &str, ctx: &mut CommandContext) -> Result<()> {
    let Some((key, value)) = args.trim().split_once('=') else {
        bail!("expected KEY=VALUE, got '{}'", args.trim());
    };
    let key = key.trim();
    if !is_identifier(key) {
        bail!("invalid variable name '{key}'");
    }

    let value = unquote(value.trim());
    tracing::debug!("Exporting {key}");
    ctx.set_var(key, value);
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one pair of matching surrounding quotes.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn expand_tilde(path: &str, ctx: &CommandContext) -> PathBuf {
    let home = || {
        ctx.var("HOME")
            .or_else(|| ctx.var("USERPROFILE"))
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    };
    if path == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home() {
            return home.join(rest);
        }
    }
    Path::new(path).to_path_buf()
}
