//! Picking the remote a session transfers to.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::store::{clean_path, ConfigStore};
use crate::transfer::is_local_root;

/// Resolve the remote for a session, prompting on the terminal when
/// `interactive`.
pub fn resolve(requested: Option<&str>, store: &mut ConfigStore, interactive: bool) -> Result<String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    resolve_with(requested, store, interactive, &mut input, &mut output)
}

/// [`resolve`] with explicit prompt streams.
///
/// - a configured remote name is used as is;
/// - an absolute directory selects the local backend;
/// - otherwise an unattended run takes the first configured remote and an
///   interactive one asks which;
/// - with no remote configured, an unattended run fails and an interactive
///   one asks for a new remote and saves it.
pub fn resolve_with<R: BufRead, W: Write>(
    requested: Option<&str>,
    store: &mut ConfigStore,
    interactive: bool,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    if let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) {
        let name = requested.trim_end_matches(':');
        if store.remotes().contains_key(name) {
            return Ok(name.to_string());
        }
        if is_local_root(requested) {
            return Ok(requested.to_string());
        }
        tracing::warn!("Remote '{requested}' is not configured");
    }

    let names: Vec<String> = store.remotes().keys().cloned().collect();

    if names.is_empty() {
        if !interactive {
            bail!("no remote exists; add one to {}", store.path().display());
        }
        return create_remote(store, input, output);
    }

    if !interactive {
        tracing::info!("Using remote '{}'", names[0]);
        return Ok(names[0].clone());
    }

    choose_remote(store, &names, input, output)
}

fn choose_remote<R: BufRead, W: Write>(
    store: &ConfigStore,
    names: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    writeln!(output, "Available remotes:")?;
    for (i, name) in names.iter().enumerate() {
        let dir = store
            .remotes()
            .get(name)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        writeln!(output, "  {}) {name} ({dir})", i + 1)?;
    }

    loop {
        let answer = prompt(input, output, &format!("Select a remote [1-{}]: ", names.len()))?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=names.len()).contains(&n) => return Ok(names[n - 1].clone()),
            _ => writeln!(output, "Invalid choice '{answer}'")?,
        }
    }
}

fn create_remote<R: BufRead, W: Write>(
    store: &mut ConfigStore,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    writeln!(output, "No remote configured.")?;
    let name = loop {
        let name = prompt(input, output, "Name of the new remote: ")?;
        if !name.is_empty() && !name.contains([':', '/', '\\']) {
            break name;
        }
        writeln!(output, "Invalid name '{name}'")?;
    };
    let dir = loop {
        let dir = clean_path(&prompt(input, output, "Directory of the remote: ")?);
        if Path::new(&dir).is_absolute() {
            break dir;
        }
        writeln!(output, "The directory must be an absolute path")?;
    };

    store
        .add_remote(&name, &dir)
        .with_context(|| format!("Failed to save remote '{name}'"))?;
    tracing::info!("Added remote '{name}' at {dir}");
    Ok(name)
}

/// Print `question` and read one trimmed line. End of input is an error.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no remote selected: input closed");
    }
    Ok(line.trim().to_string())
}
