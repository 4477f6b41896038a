//! Parse command implementation.
//!
//! Prints the canonical form of an expression, or its syntax tree as JSON.

use exprcalc_rs::parse;

use super::{read_expression, CommandContext, Result};

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let text = read_expression(expression)?;
    let expr = parse(&text)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&expr)?);
    } else if !ctx.quiet {
        println!("{}", expr);
    }

    Ok(())
}
