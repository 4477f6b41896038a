//! Tokens command implementation.
//!
//! Prints the token stream of an expression, one token per line.

use exprcalc_rs::lexer::{PositionedToken, Token};
use exprcalc_rs::{Lexer, ParseError};
use owo_colors::OwoColorize;

use super::{read_expression, CommandContext, Result};

/// Returns a short name for the token's kind.
fn token_kind(token: &Token) -> &'static str {
    match token {
        Token::And => "and",
        Token::Or => "or",
        Token::Boolean(_) => "boolean",
        Token::Number(_) => "number",
        Token::String(_) => "string",
        Token::Identifier(_) => "identifier",
        Token::Compare(_) => "compare",
        Token::OpenParen => "open_paren",
        Token::CloseParen => "close_paren",
    }
}

/// Executes the tokens command.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let text = read_expression(expression)?;
    let tokens = Lexer::new(&text)
        .tokenize()
        .map_err(ParseError::from)?;

    if ctx.json_output {
        let output: Vec<_> = tokens.iter().map(token_json).collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        for positioned in &tokens {
            let kind = token_kind(&positioned.token);
            if ctx.use_colors {
                println!(
                    "{}\t{}\t{}",
                    positioned.position.dimmed(),
                    kind.cyan(),
                    positioned.token
                );
            } else {
                println!("{}\t{}\t{}", positioned.position, kind, positioned.token);
            }
        }
    }

    Ok(())
}

fn token_json(positioned: &PositionedToken) -> serde_json::Value {
    serde_json::json!({
        "kind": token_kind(&positioned.token),
        "text": positioned.token.to_string(),
        "position": positioned.position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kinds() {
        let kinds: Vec<_> = Lexer::new("(a == 'x') and TRUE or 1")
            .map(|t| token_kind(&t.unwrap().token))
            .collect();
        assert_eq!(
            kinds,
            vec![
                "open_paren",
                "identifier",
                "compare",
                "string",
                "close_paren",
                "and",
                "boolean",
                "or",
                "number",
            ]
        );
    }

    #[test]
    fn test_token_json_shape() {
        let token = Lexer::new("  age").next().unwrap().unwrap();
        let json = token_json(&token);
        assert_eq!(json["kind"], "identifier");
        assert_eq!(json["text"], "age");
        assert_eq!(json["position"]["line"], 1);
        assert_eq!(json["position"]["column"], 3);
        assert_eq!(json["position"]["offset"], 2);
    }
}
