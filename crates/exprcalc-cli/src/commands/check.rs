//! Check command implementation.
//!
//! Validates an expression without evaluating it and lists the identifiers
//! a host would need to supply.

use exprcalc_rs::parse;
use owo_colors::OwoColorize;

use super::{read_expression, CommandContext, Result};

/// Executes the check command.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let text = read_expression(expression)?;
    let expr = parse(&text)?;
    let identifiers = expr.identifiers();

    if ctx.json_output {
        let output = serde_json::json!({
            "valid": true,
            "canonical": expr.to_string(),
            "identifiers": identifiers,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if ctx.use_colors {
            println!("{}", "valid".green());
        } else {
            println!("valid");
        }
        if !identifiers.is_empty() {
            println!("identifiers: {}", identifiers.join(", "));
        }
    }

    Ok(())
}
