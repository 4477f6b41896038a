//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the exprcalc CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use exprcalc_rs::HostValue;

use crate::commands::vars::parse_var;

/// exprcalc - Evaluate boolean and comparison expressions
#[derive(Parser, Debug)]
#[command(name = "exprcalc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an expression and print its value
    #[command(alias = "e")]
    Eval {
        /// Expression to evaluate ("-" reads it from stdin)
        expression: String,

        /// Bind a variable (repeatable), e.g. --var age=22 --var name='"bob"'
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var, action = clap::ArgAction::Append)]
        var: Vec<(String, HostValue)>,

        /// Load variables from a JSON or TOML file
        #[arg(long = "vars", value_name = "FILE")]
        vars_file: Option<PathBuf>,

        /// Ignore variables from the config file
        #[arg(long)]
        no_config: bool,
    },

    /// Parse an expression and print its canonical form
    #[command(alias = "p")]
    Parse {
        /// Expression to parse ("-" reads it from stdin)
        expression: String,
    },

    /// Print the tokens of an expression
    Tokens {
        /// Expression to tokenize ("-" reads it from stdin)
        expression: String,
    },

    /// Check that an expression parses and list its identifiers
    #[command(alias = "c")]
    Check {
        /// Expression to check ("-" reads it from stdin)
        expression: String,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,
}
