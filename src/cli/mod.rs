//! Command-line interface.

pub mod check;
pub mod completions;
pub mod context;
pub mod items;
pub mod migrate;
pub mod output;
pub mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constants;
use crate::core::policy::Accessibility;

/// Coffer - identifier-scoped secure storage for small secrets.
#[derive(Parser)]
#[command(
    name = "coffer",
    about = "Identifier-scoped secure storage for small secrets",
    version
)]
pub struct Cli {
    /// Config file (default: <config dir>/coffer/config.toml)
    #[arg(long, global = true, env = constants::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Store a value
    Set {
        /// Item key
        key: String,
        /// Item value
        value: String,
    },

    /// Print a stored value
    Get {
        /// Item key
        key: String,
        /// Text shown when the store asks for user presence
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Remove a value
    Rm {
        /// Item key
        key: String,
    },

    /// List stored keys
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report whether a key is stored, without prompting
    Contains {
        /// Item key
        key: String,
    },

    /// Remove every item in the store
    Clear {
        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the configured store and probe access
    Check,

    /// Move every item of another store into the configured one
    Migrate {
        /// Identifier of the source store
        #[arg(long)]
        from: String,
        /// Accessibility tier of the source store (default: the configured tier)
        #[arg(long, value_parser = parse_accessibility)]
        from_accessibility: Option<Accessibility>,
        /// The source store is device-local
        #[arg(long)]
        from_device_local: bool,
        /// Remove migrated items from the source
        #[arg(long)]
        remove: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

fn parse_accessibility(s: &str) -> std::result::Result<Accessibility, String> {
    s.parse().map_err(|e: crate::error::ValidationError| e.to_string())
}

/// Execute a command.
pub fn execute(command: Command, config: Option<PathBuf>) -> crate::error::Result<()> {
    use Command::*;

    if let Completions { shell } = &command {
        return completions::execute(shell.clone());
    }

    let ctx = context::Context::open(config.as_deref())?;
    match command {
        Set { key, value } => items::set(&ctx, &key, &value),
        Get { key, prompt } => items::get(&ctx, &key, prompt.as_deref()),
        Rm { key } => items::rm(&ctx, &key),
        List { json } => items::list(&ctx, json),
        Contains { key } => items::contains(&ctx, &key),
        Clear { yes } => items::clear(&ctx, yes),
        Check => check::execute(&ctx),
        Migrate {
            from,
            from_accessibility,
            from_device_local,
            remove,
        } => migrate::execute(&ctx, &from, from_accessibility, from_device_local, remove),
        Completions { .. } => Ok(()),
    }
}
