//! Command implementations for the exprcalc CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod check;
pub mod completions;
pub mod config;
pub mod eval;
pub mod parse;
pub mod tokens;
pub mod vars;

use std::io::{self, Read};

use exprcalc_rs::{EvalError, ParseError, Position};

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The expression did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The expression parsed but failed to evaluate.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// Configuration or variable-file error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// Returns the expression position the error points at, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            CommandError::Parse(e) => Some(e.position()),
            CommandError::Eval(e) => Some(e.position()),
            _ => None,
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && std::env::var_os("NO_COLOR").is_none(),
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }
}

/// Returns the expression text, reading stdin when the argument is `-`.
pub fn read_expression(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}
