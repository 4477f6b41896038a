//! Error types for tokenizing, parsing and evaluating expressions.

use thiserror::Error;

use crate::lexer::Position;

/// Failure type returned by a host [`Resolve`](crate::Resolve) implementation.
pub type ResolveError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized Result type for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A specialized Result type for evaluation operations.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// A specialized Result type for [`eval`](crate::eval), which parses and evaluates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the tokenizer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// No token pattern matches at this position.
    #[error("{position}: unexpected character '{found}'")]
    UnexpectedCharacter {
        /// Where the character was found.
        position: Position,
        /// The character that could not be tokenized.
        found: char,
    },

    /// A string literal was opened but never closed.
    #[error("{position}: unterminated string literal")]
    UnterminatedString {
        /// Position of the opening quote.
        position: Position,
    },
}

impl LexError {
    /// Returns the source position of the error.
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position } => *position,
        }
    }
}

/// Grammar violations found by the parser.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    /// A token appeared where the grammar expected something else.
    #[error("{position}: unexpected token {found}, expected {expected}")]
    UnexpectedToken {
        /// Position of the offending token.
        position: Position,
        /// Source form of the offending token.
        found: String,
        /// Description of what the grammar expected.
        expected: &'static str,
    },

    /// The input ended while the grammar still expected a token.
    #[error("{position}: unexpected end of expression, expected {expected}")]
    UnexpectedEndOfInput {
        /// End-of-input position.
        position: Position,
        /// Description of what the grammar expected.
        expected: &'static str,
    },

    /// A `(` was never matched by a `)`.
    #[error("{position}: unclosed parenthesis")]
    UnclosedParenthesis {
        /// Position of the opening parenthesis.
        position: Position,
    },

    /// `()` with nothing between the parentheses.
    #[error("{position}: empty sub-expression")]
    EmptySubExpression {
        /// Position of the opening parenthesis.
        position: Position,
    },

    /// Parentheses nested deeper than the parser allows.
    #[error(
        "{position}: parentheses nested more than {} levels deep",
        crate::parser::ExpressionParser::MAX_NESTING_DEPTH
    )]
    NestingTooDeep {
        /// Position of the first `(` past the limit.
        position: Position,
    },

    /// A complete expression was parsed but tokens remain.
    #[error("{position}: unexpected trailing input {found}")]
    TrailingInput {
        /// Position of the first leftover token.
        position: Position,
        /// Source form of the first leftover token.
        found: String,
    },
}

impl SyntaxError {
    /// Creates an unexpected token error.
    pub fn unexpected(position: Position, found: impl ToString, expected: &'static str) -> Self {
        SyntaxError::UnexpectedToken {
            position,
            found: found.to_string(),
            expected,
        }
    }

    /// Returns the source position of the error.
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::UnexpectedEndOfInput { position, .. }
            | SyntaxError::UnclosedParenthesis { position }
            | SyntaxError::EmptySubExpression { position }
            | SyntaxError::NestingTooDeep { position }
            | SyntaxError::TrailingInput { position, .. } => *position,
        }
    }
}

/// Errors returned by [`parse`](crate::parse).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The text could not be tokenized.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// The tokens do not form a valid expression.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    /// Returns the source position of the error.
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::Syntax(e) => e.position(),
        }
    }
}

/// Errors raised while walking a parsed expression.
#[derive(Debug, Error)]
pub enum EvalError {
    /// An operand had the wrong type for its operator.
    #[error("{position}: type error: {message}")]
    Type {
        /// Position of the comparison or logical node.
        position: Position,
        /// What was wrong with the operand.
        message: String,
    },

    /// An identifier was used but no context was supplied.
    #[error("{position}: identifier `{name}` used with no evaluation context")]
    Context {
        /// Position of the identifier.
        position: Position,
        /// The identifier name.
        name: String,
    },

    /// The context failed to resolve an identifier.
    #[error("{position}: cannot resolve identifier `{name}`: {source}")]
    Identifier {
        /// Position of the identifier.
        position: Position,
        /// The identifier name.
        name: String,
        /// The resolver's own error.
        #[source]
        source: ResolveError,
    },
}

impl EvalError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(position: Position, message: impl Into<String>) -> Self {
        EvalError::Type {
            position,
            message: message.into(),
        }
    }

    /// Returns the source position of the error.
    pub fn position(&self) -> Position {
        match self {
            EvalError::Type { position, .. }
            | EvalError::Context { position, .. }
            | EvalError::Identifier { position, .. } => *position,
        }
    }
}

/// Any error from [`eval`](crate::eval).
#[derive(Debug, Error)]
pub enum Error {
    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Evaluation failed.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl Error {
    /// Returns the source position of the error.
    pub fn position(&self) -> Position {
        match self {
            Error::Parse(e) => e.position(),
            Error::Eval(e) => e.position(),
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Parse(err.into())
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::Parse(err.into())
    }
}
