//! Eval command implementation.
//!
//! Parses an expression, binds variables and prints the resulting value.

use std::path::PathBuf;

use exprcalc_rs::{parse, Context, HostValue, Value};
use owo_colors::OwoColorize;

use super::config::{get_config_path, Config};
use super::vars::{load_vars_file, VariableResolver, Variables};
use super::{read_expression, CommandContext, Result};

/// Options for the eval command.
#[derive(Debug, Default)]
pub struct EvalOptions {
    /// Expression text, or `-` for stdin.
    pub expression: String,
    /// Variables given with `--var`, in command-line order.
    pub vars: Vec<(String, HostValue)>,
    /// Optional `--vars` file.
    pub vars_file: Option<PathBuf>,
    /// Loaded config file, or `None` with `--no-config`.
    pub config: Option<Config>,
}

/// Collects variables from all sources; later sources win.
fn collect_variables(ctx: &CommandContext, opts: &EvalOptions) -> Result<Variables> {
    let mut variables = Variables::new();

    if let Some(config) = &opts.config {
        let from_config = config.variables()?;
        if ctx.verbose {
            eprintln!(
                "Loaded {} variable(s) from {}",
                from_config.len(),
                get_config_path()?.display()
            );
        }
        variables.extend(from_config);
    }

    if let Some(path) = &opts.vars_file {
        let from_file = load_vars_file(path)?;
        if ctx.verbose {
            eprintln!(
                "Loaded {} variable(s) from {}",
                from_file.len(),
                path.display()
            );
        }
        variables.extend(from_file);
    }

    if ctx.verbose && !opts.vars.is_empty() {
        eprintln!("Loaded {} variable(s) from --var", opts.vars.len());
    }
    variables.extend(opts.vars.iter().cloned());

    Ok(variables)
}

/// Executes the eval command.
pub fn execute(ctx: &CommandContext, opts: &EvalOptions) -> Result<()> {
    let text = read_expression(&opts.expression)?;
    let expr = parse(&text)?;
    if ctx.verbose {
        eprintln!("Parsed: {}", expr);
    }

    let variables = collect_variables(ctx, opts)?;
    let resolver = VariableResolver::new(variables, ctx.verbose);
    let value = expr.evaluate(&Context::new(&resolver))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "expression": expr.to_string(),
            "result": value,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("{}", format_value(value.as_ref(), ctx.use_colors));
    }

    Ok(())
}

/// Formats a result for terminal output; `null` stands for no value.
fn format_value(value: Option<&Value>, use_colors: bool) -> String {
    let plain = match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    };

    if !use_colors {
        return plain;
    }

    match value {
        Some(Value::Boolean(true)) => plain.green().to_string(),
        Some(Value::Boolean(false)) => plain.red().to_string(),
        Some(Value::Number(_)) => plain.cyan().to_string(),
        Some(Value::Text(_)) => plain.yellow().to_string(),
        None => plain.dimmed().to_string(),
    }
}
