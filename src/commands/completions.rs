//! `haul completions <SHELL>`

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Write the completion script for `shell` to stdout.
pub fn execute(cmd: &mut Command, shell: Shell) {
    generate_to(cmd, shell, &mut io::stdout());
}

pub fn generate_to(cmd: &mut Command, shell: Shell, output: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, output);
}
