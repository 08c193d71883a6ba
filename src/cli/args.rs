//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Running `stackup` without a
//! subcommand is the same as `stackup new`.

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Stackup - Bootstrap a full-stack starter project, idempotently.
#[derive(Debug, Parser)]
#[command(name = "stackup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to settings file (overrides ~/.config/stackup/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Arguments for the default `new` command
    #[command(flatten)]
    pub new: NewArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Arguments of the bootstrap to run, if the command bootstraps.
    pub fn new_args(&self) -> Option<&NewArgs> {
        match &self.command {
            Some(Commands::New(args)) => Some(args),
            None => Some(&self.new),
            Some(_) => None,
        }
    }

    /// Whether confirmations are auto-approved.
    pub fn assume_yes(&self) -> bool {
        self.new_args().is_some_and(|args| args.yes)
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bootstrap a project (default if no command specified)
    New(NewArgs),

    /// Report what a bootstrap would install, without changing anything
    Check(CheckArgs),

    /// List the files every new project receives
    Templates,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Project selection and toolchain pins shared by `new` and `check`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProjectArgs {
    /// Project name (prompted for when omitted)
    #[arg(env = "STACKUP_PROJECT_NAME")]
    pub name: Option<String>,

    /// Project root (defaults to ./<NAME>)
    #[arg(long, env = "STACKUP_ROOT")]
    pub root: Option<PathBuf>,

    /// Python version to install (overrides settings)
    #[arg(long, value_name = "VERSION")]
    pub python: Option<String>,

    /// Node.js version to install (overrides settings)
    #[arg(long, value_name = "VERSION")]
    pub node: Option<String>,

    /// Do not install backend and frontend dependencies
    #[arg(long)]
    pub skip_deps: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `new` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct NewArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Approve every confirmation (non-interactive)
    #[arg(
        short,
        long,
        env = "STACKUP_NON_INTERACTIVE",
        value_parser = FalseyValueParser::new()
    )]
    pub yes: bool,

    /// Back up and overwrite files that differ from the templates
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
