//! `haul config path` / `haul config show`

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use crate::config::ConfigStore;

pub fn path(explicit: Option<&Path>) -> Result<()> {
    path_with_writer(explicit, &mut io::stdout())
}

pub fn show(explicit: Option<&Path>) -> Result<()> {
    show_with_writer(explicit, &mut io::stdout())
}

pub(crate) fn path_with_writer(explicit: Option<&Path>, output: &mut dyn Write) -> Result<()> {
    let path = ConfigStore::locate(explicit);
    let state = if path.is_file() { "" } else { " (not created yet)" };
    writeln!(output, "{}{state}", path.display())?;
    Ok(())
}

pub(crate) fn show_with_writer(explicit: Option<&Path>, output: &mut dyn Write) -> Result<()> {
    let path = ConfigStore::locate(explicit);
    if !path.is_file() {
        writeln!(output, "No config file at {}", path.display())?;
        return Ok(());
    }
    let store = ConfigStore::open(&path)?;
    let json = serde_json::to_string_pretty(store.config()).context("Failed to render config")?;
    writeln!(output, "{json}")?;
    Ok(())
}
