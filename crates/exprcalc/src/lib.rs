//! Embeddable evaluator for boolean/comparison expressions.
//!
//! Expressions combine literals and host-supplied identifiers with
//! comparison operators, `AND`/`OR` and parentheses, and evaluate to a single
//! number, string or boolean. Typical use is a filter predicate such as
//! "does this record match?".
//!
//! # Supported Syntax
//!
//! ## Literals
//! - Numbers: `42`, `-1.5`, `+10`, `.5`, `1.234e9`
//! - Strings: `"text"` or `'text'` (no escapes)
//! - Booleans: `true`, `false` (any case)
//!
//! ## Identifiers
//! - `age`, `_id`, `field_2`: resolved by the host through [`Resolve`]
//!   (case-sensitive)
//!
//! ## Operators (loosest first)
//! - `OR` (any case)
//! - `AND` (any case)
//! - `==`, `!=`, `<`, `>`, `<=`, `>=`
//! - `()` - Grouping
//!
//! There is no arithmetic, no functions and no implicit conversion between
//! numbers, strings and booleans.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use exprcalc_rs::{eval, parse, evaluate, HostValue, Value};
//!
//! // One-shot evaluation
//! assert_eq!(eval("1 < 2 AND 'a' != 'b'", None).unwrap(), Some(Value::Boolean(true)));
//!
//! // Parse once, evaluate many times
//! let expr = parse(r#"gender == "male" AND age >= 18"#).unwrap();
//! let alice = HashMap::from([
//!     ("gender".to_string(), HostValue::from("female")),
//!     ("age".to_string(), HostValue::from(30)),
//! ]);
//! let bob = HashMap::from([
//!     ("gender".to_string(), HostValue::from("male")),
//!     ("age".to_string(), HostValue::from(22)),
//! ]);
//! assert_eq!(evaluate(&expr, Some(&alice)).unwrap(), Some(Value::Boolean(false)));
//! assert_eq!(evaluate(&expr, Some(&bob)).unwrap(), Some(Value::Boolean(true)));
//!
//! // Empty input has no value
//! assert_eq!(eval("", None).unwrap(), None);
//! ```

pub mod ast;
mod context;
mod error;
mod evaluator;
pub mod lexer;
mod parser;
mod value;

pub use ast::{CompareOp, Expression};
pub use context::{Context, FnResolver, Resolve, UnknownIdentifier};
pub use error::{
    Error, EvalError, EvalResult, LexError, ParseError, ParseResult, ResolveError, Result,
    SyntaxError,
};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Position};
pub use parser::ExpressionParser;
pub use value::{HostValue, Operand, Value};

/// Parses `text` into a reusable [`Expression`].
///
/// Empty or whitespace-only text gives the empty expression, which evaluates
/// to no value.
///
/// # Errors
///
/// Returns [`ParseError::Lex`] for characters no token matches and
/// [`ParseError::Syntax`] for grammar violations.
pub fn parse(text: &str) -> ParseResult<Expression> {
    ExpressionParser::parse(text)
}

/// Evaluates a parsed expression.
///
/// `resolver` supplies identifier values; with `None`, any identifier in the
/// expression fails with [`EvalError::Context`].
///
/// # Errors
///
/// Returns [`EvalError::Type`] for operand type mismatches,
/// [`EvalError::Context`] for identifiers without a resolver, and
/// [`EvalError::Identifier`] when the resolver fails.
pub fn evaluate(expr: &Expression, resolver: Option<&dyn Resolve>) -> EvalResult<Option<Value>> {
    Evaluator::new(Context::from(resolver)).evaluate(expr)
}

/// Parses and evaluates `text` in one step.
///
/// Empty text returns `Ok(None)` without invoking the parser.
pub fn eval(text: &str, resolver: Option<&dyn Resolve>) -> Result<Option<Value>> {
    if text.is_empty() {
        return Ok(None);
    }

    let expr = parse(text)?;
    Ok(evaluate(&expr, resolver)?)
}
