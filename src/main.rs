use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use haul::commands::{backup, completions, config};
use haul::config::DEFAULT_ENV_FILE;
use haul::logging::DEFAULT_LOG_FILE;
use haul::models::options::DEFAULT_REMOTE_ROOT;
use haul::models::Direction;
use haul::transfer::DEFAULT_FAULT_RATE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "haul")]
#[command(about = "Per-machine backup orchestrator", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ./.haul.json, ./configs/.haul.json, ~/.haul.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment file with the notification settings
    #[arg(short, long, global = true, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Directory on the remote that holds every machine's backups
    #[arg(short, long, global = true, default_value = DEFAULT_REMOTE_ROOT)]
    root: String,

    /// Report language, most preferred first (repeatable)
    #[arg(short, long = "lang", global = true)]
    lang: Vec<String>,

    /// Extra message catalog (lang.<tag>.toml)
    #[arg(long, global = true)]
    lang_file: Option<PathBuf>,

    /// Session log file, overwritten on every run
    #[arg(short = 'o', long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// No prompts and no console log; send heartbeats
    #[arg(short, long, global = true)]
    unattended: bool,

    /// Log transfers instead of performing them, with random failures
    #[arg(short, long, global = true)]
    simulate: bool,

    /// Probability of a simulated failure per path
    #[arg(long, global = true, default_value_t = DEFAULT_FAULT_RATE)]
    fault_rate: f64,

    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up this machine's paths to a remote
    Upload {
        /// Remote name or absolute directory
        remote: Option<String>,
    },

    /// Restore this machine's paths from a remote
    Download {
        /// Remote name or absolute directory
        remote: Option<String>,
    },

    /// Inspect the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the path of the config file in use
    Path,
    /// Print the config file
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let direction = match &cli.command {
        Commands::Upload { .. } => Direction::Upload,
        Commands::Download { .. } => Direction::Download,
        Commands::Config { command } => {
            return match command {
                ConfigCommands::Path => config::path(cli.config.as_deref()),
                ConfigCommands::Show => config::show(cli.config.as_deref()),
            };
        }
        Commands::Completions { shell } => {
            completions::execute(&mut Cli::command(), *shell);
            return Ok(());
        }
    };

    let remote = match cli.command {
        Commands::Upload { remote } | Commands::Download { remote } => remote,
        _ => None,
    };

    backup::execute(backup::BackupArgs {
        direction,
        remote,
        config: cli.config,
        env_file: cli.env_file,
        root: cli.root,
        languages: cli.lang,
        lang_file: cli.lang_file,
        log_file: cli.log_file,
        unattended: cli.unattended,
        simulate: cli.simulate,
        fault_rate: cli.fault_rate,
        debug: cli.debug,
    })
}
