//! Command-line interface.

pub mod completions;
pub mod output;
pub mod prompt;
pub mod secrets;
pub mod shell;
pub mod unlock;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::core::config::Config;
use crate::error::Result;

/// coffer - secrets in a file, keys on your Trezor.
#[derive(Parser)]
#[command(
    name = "coffer",
    about = "Encrypted key-value store unlocked by a Trezor hardware wallet",
    version,
    after_help = "Run without a subcommand to open the interactive shell."
)]
pub struct Cli {
    /// Store file (defaults to `file` from the config)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Config file (defaults to $COFFER_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Open the interactive shell (default)
    Shell,

    /// List stored keys
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decrypt and print a value
    Get {
        /// Entry key
        key: String,
        /// Print the stored hex record instead of decrypting
        #[arg(long)]
        no_decrypt: bool,
    },

    /// Add a new entry (value read from a hidden prompt or stdin)
    Put {
        /// Entry key
        key: String,
    },

    /// Delete an entry
    Rm {
        /// Entry key
        key: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shells supported by `completions`.
#[derive(Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

/// Options shared by every command that opens the store.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub file: Option<PathBuf>,
    pub yes: bool,
}

/// Dispatch a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Shell);

    if let Command::Completions { shell } = command {
        return completions::execute(shell);
    }

    let config = Config::load(cli.config.as_deref())?;
    let ctx = Context {
        file: cli.file.or_else(|| config.file.clone()),
        config,
        yes: cli.yes,
    };
    debug!(file = ?ctx.file, "resolved store file");

    match command {
        Command::Shell => shell::execute(&ctx),
        Command::List { json } => secrets::list(&ctx, json),
        Command::Get { key, no_decrypt } => secrets::get(&ctx, &key, no_decrypt),
        Command::Put { key } => secrets::put(&ctx, &key),
        Command::Rm { key } => secrets::rm(&ctx, &key),
        Command::Completions { .. } => Ok(()),
    }
}
