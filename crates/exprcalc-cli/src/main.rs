use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, Config};
use commands::eval::EvalOptions;
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", error_json(&e));
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(error_exit_status(&e))
        }
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    let ctx = CommandContext::from_cli(cli);

    match &cli.command {
        Commands::Eval {
            expression,
            var,
            vars_file,
            no_config,
        } => {
            let config = if *no_config {
                None
            } else {
                Some(load_config()?)
            };
            let ctx = apply_config_colors(ctx, config.as_ref());
            let opts = EvalOptions {
                expression: expression.clone(),
                vars: var.clone(),
                vars_file: vars_file.clone(),
                config,
            };
            commands::eval::execute(&ctx, &opts)
        }
        Commands::Parse { expression } => commands::parse::execute(&ctx, expression),
        Commands::Tokens { expression } => commands::tokens::execute(&ctx, expression),
        Commands::Check { expression } => commands::check::execute(&ctx, expression),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
            Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
        },
        Commands::Completions { shell } => Ok(commands::completions::execute(shell)?),
    }
}

/// Turns colors off when the config file's `[output] color` says so.
fn apply_config_colors(mut ctx: CommandContext, config: Option<&Config>) -> CommandContext {
    if config.is_some_and(|c| c.output.color == Some(false)) {
        ctx.use_colors = false;
    }
    ctx
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Parse(_) => "PARSE_ERROR",
        CommandError::Eval(_) => "EVAL_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Renders an error as the JSON document printed in `--json` mode.
fn error_json(e: &CommandError) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": error_code(e),
            "message": e.to_string(),
            "position": e.position(),
        }
    })
}

/// Returns the process exit status for an error.
fn error_exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Parse(_) => 1,
        CommandError::Eval(_) => 2,
        CommandError::Io(_) => 3,
        CommandError::Config(_) => 5,
        CommandError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprcalc_rs::parse;

    #[test]
    fn test_error_json_for_parse_error() {
        let err = CommandError::from(parse("a AND").unwrap_err());
        let json = error_json(&err);
        assert_eq!(json["error"]["code"], "PARSE_ERROR");
        assert_eq!(json["error"]["position"]["column"], 6);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("parse error: "));
    }

    #[test]
    fn test_error_json_without_position() {
        let err = CommandError::Config("bad".to_string());
        let json = error_json(&err);
        assert_eq!(json["error"]["code"], "CONFIG_ERROR");
        assert!(json["error"]["position"].is_null());
    }

    #[test]
    fn test_apply_config_colors() {
        let ctx = || CommandContext {
            json_output: false,
            use_colors: true,
            quiet: false,
            verbose: false,
        };

        assert!(apply_config_colors(ctx(), None).use_colors);
        assert!(apply_config_colors(ctx(), Some(&Config::default())).use_colors);

        let mut config = Config::default();
        config.output.color = Some(false);
        assert!(!apply_config_colors(ctx(), Some(&config)).use_colors);
    }

    #[test]
    fn test_error_codes() {
        let parse_err = CommandError::from(parse("(").unwrap_err());
        assert_eq!(error_code(&parse_err), "PARSE_ERROR");
        assert_eq!(error_exit_status(&parse_err), 1);

        let eval_err = CommandError::from(
            parse("1 == 'a'")
                .unwrap()
                .evaluate(&exprcalc_rs::Context::empty())
                .unwrap_err(),
        );
        assert_eq!(error_code(&eval_err), "EVAL_ERROR");
        assert_eq!(error_exit_status(&eval_err), 2);

        let io_err = CommandError::from(std::io::Error::other("boom"));
        assert_eq!(error_exit_status(&io_err), 3);

        let config_err = CommandError::Config("bad".to_string());
        assert_eq!(error_exit_status(&config_err), 5);
    }
}
