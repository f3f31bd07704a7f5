//! `haul upload` / `haul download`

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{self, ConfigStore};
use crate::i18n::Localizer;
use crate::logging::{self, LogConfig};
use crate::models::{Direction, Options};
use crate::notify::Notifier;
use crate::report::Severity;
use crate::session::{Session, SessionSummary};
use crate::transfer::{FaultInjector, LocalProvider};

/// Everything a backup run needs from the command line.
#[derive(Debug, Clone)]
pub struct BackupArgs {
    pub direction: Direction,
    pub remote: Option<String>,
    pub config: Option<PathBuf>,
    pub env_file: PathBuf,
    pub root: String,
    pub languages: Vec<String>,
    pub lang_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub unattended: bool,
    pub simulate: bool,
    pub fault_rate: f64,
    pub debug: bool,
}

pub fn execute(args: BackupArgs) -> Result<()> {
    let log = logging::init(&LogConfig {
        path: args.log_file.clone(),
        console: !args.unattended,
        debug: args.debug,
    })?;
    config::load_env_file(&args.env_file);

    let mut localizer = Localizer::embedded();
    if let Some(lang_file) = &args.lang_file {
        let tag = localizer.load_file(lang_file)?;
        tracing::debug!("Loaded language '{tag}' from {}", lang_file.display());
    }

    let mut store = ConfigStore::load_or_create(args.config.as_deref())?;
    let hostname = hostname::get()
        .context("Failed to read the hostname")?
        .to_string_lossy()
        .into_owned();
    let profile = store.current_machine(&hostname)?;

    let remote = config::remote::resolve(args.remote.as_deref(), &mut store, !args.unattended)?;

    let options = Options::builder()
        .remote(remote)
        .remote_root(args.root.as_str())
        .direction(args.direction)
        .simulate(args.simulate)
        .interactive(!args.unattended)
        .debug(args.debug)
        .languages(args.languages.iter().cloned())
        .build();

    let notifier = match Notifier::from_env() {
        Ok(notifier) => Some(notifier.with_log_path(log.log_path())),
        Err(e) => {
            tracing::warn!("Notifications disabled: {e:#}");
            None
        }
    };

    let provider = LocalProvider::new(store.remotes().clone());
    let session = Session::new(options, profile, provider, localizer)
        .with_notifier(notifier)
        .with_faults(FaultInjector::new(args.fault_rate));

    let summary = session.run();
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    if summary.is_idle() {
        println!("{} Nothing to do", "•".dimmed());
        return;
    }

    let elapsed = format!("{:.1}s", summary.elapsed.as_secs_f64());
    match summary.severity {
        Severity::Success => println!("{} {} ({elapsed})", "✓".green().bold(), summary.report),
        Severity::Minor | Severity::Moderate => {
            println!("{} {} ({elapsed})", "!".yellow().bold(), summary.report)
        }
        Severity::Major | Severity::Critical | Severity::Total => {
            println!("{} {} ({elapsed})", "✗".red().bold(), summary.report)
        }
    }
}
