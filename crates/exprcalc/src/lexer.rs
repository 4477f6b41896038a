//! Lexer (tokenizer) for expressions.

use std::fmt;
use std::str::Chars;

use serde::Serialize;

use crate::ast::CompareOp;
use crate::error::LexError;

/// A location in the source text.
///
/// `offset` is a 0-indexed byte offset; `line` and `column` are 1-indexed,
/// with columns counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl Position {
    /// The position of the first character of any input.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token in an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ==================== Logic ====================
    /// The `AND` keyword (any case).
    And,

    /// The `OR` keyword (any case).
    Or,

    // ==================== Literals ====================
    /// A `true` or `false` literal (any case).
    Boolean(bool),

    /// A numeric literal such as `42`, `-1.5` or `1.234e9`.
    Number(f64),

    /// A quoted string literal, with the quotes removed.
    String(String),

    // ==================== Names ====================
    /// A host-resolved name such as `age` or `_id2`.
    Identifier(String),

    // ==================== Operators ====================
    /// One of `==`, `!=`, `<`, `>`, `<=`, `>=`.
    Compare(CompareOp),

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Boolean(b) => write!(f, "{b}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::String(s) => write!(f, "{s:?}"),
            Token::Identifier(name) => f.write_str(name),
            Token::Compare(op) => write!(f, "{op}"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
        }
    }
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// Where the token starts.
    pub position: Position,
}

/// Lexer for tokenizing expressions.
///
/// The lexer is a lazy iterator over `Result<PositionedToken, LexError>`.
/// It yields at most one error and then stops. Cloning a lexer gives an
/// independent cursor over the same input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    chars: Chars<'a>,
    /// Position of the next unread character.
    position: Position,
    /// Set once an error has been yielded.
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            position: Position::START,
            failed: false,
        }
    }

    /// Returns the position just past the last character consumed.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Peeks `n` characters ahead without consuming anything.
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position.offset += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    fn skip_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.next_char();
        }
    }

    /// Returns true if a number literal starts `offset` characters ahead.
    ///
    /// A number needs a digit, or a `.` followed by a digit.
    fn number_starts_at(&self, offset: usize) -> bool {
        match self.peek_nth(offset) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_nth(offset + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// Reads a number literal: `[-+]?\d*\.?\d+([eE][-+]?\d+)?`.
    fn read_number(&mut self) -> f64 {
        let mut text = String::new();

        if let Some(sign @ ('+' | '-')) = self.peek() {
            text.push(sign);
            self.next_char();
        }

        self.skip_digits(&mut text);

        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.next_char();
            self.skip_digits(&mut text);
        }

        // The exponent is only taken when at least one digit follows it.
        if let Some(e @ ('e' | 'E')) = self.peek() {
            let digits_at = match self.peek_nth(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_nth(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                text.push(e);
                self.next_char();
                if digits_at == 2 {
                    text.extend(self.next_char());
                }
                self.skip_digits(&mut text);
            }
        }

        // The scanned text is always valid float syntax.
        text.parse().unwrap_or(f64::NAN)
    }

    /// Reads a word made of ASCII letters, digits and underscores.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        word
    }

    /// Reads a string delimited by `quote` on both ends.
    fn read_quoted_string(&mut self, quote: char, start: Position) -> Result<String, LexError> {
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        loop {
            match self.next_char() {
                Some(c) if c == quote => return Ok(result),
                Some(c) => result.push(c),
                None => return Err(LexError::UnterminatedString { position: start }),
            }
        }
    }

    /// Reads a comparison operator or parenthesis.
    fn read_operator(&mut self, start: Position) -> Result<Token, LexError> {
        let first = self.next_char().unwrap_or_default();
        let second = self.peek();

        let token = match (first, second) {
            ('=', Some('=')) => Token::Compare(CompareOp::Eq),
            ('!', Some('=')) => Token::Compare(CompareOp::Ne),
            ('<', Some('=')) => Token::Compare(CompareOp::Le),
            ('>', Some('=')) => Token::Compare(CompareOp::Ge),
            ('<', _) => return Ok(Token::Compare(CompareOp::Lt)),
            ('>', _) => return Ok(Token::Compare(CompareOp::Gt)),
            ('(', _) => return Ok(Token::OpenParen),
            (')', _) => return Ok(Token::CloseParen),
            (found, _) => {
                return Err(LexError::UnexpectedCharacter {
                    position: start,
                    found,
                })
            }
        };
        self.next_char();
        Ok(token)
    }

    /// Classifies a word: logic keywords and boolean literals take priority
    /// over identifiers and match regardless of case.
    ///
    /// Matching is on the whole word, so `order` and `trueish` stay identifiers.
    fn classify_word(word: String) -> Token {
        match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            _ => Token::Identifier(word),
        }
    }

    /// Returns the next token with its position, or `None` at end of input.
    fn next_token(&mut self) -> Option<Result<PositionedToken, LexError>> {
        self.skip_whitespace();

        let c = self.peek()?;
        let start = self.position;

        let token = match c {
            // Identifiers and keywords
            _ if c.is_ascii_alphabetic() || c == '_' => Ok(Self::classify_word(self.read_word())),

            // Numbers (optionally signed)
            '+' | '-' if self.number_starts_at(1) => Ok(Token::Number(self.read_number())),
            _ if self.number_starts_at(0) => Ok(Token::Number(self.read_number())),

            // Strings
            '\'' | '"' => self.read_quoted_string(c, start).map(Token::String),

            // Operators, parentheses, or anything unrecognized
            _ => self.read_operator(start),
        };

        Some(token.map(|token| PositionedToken {
            token,
            position: start,
        }))
    }

    /// Collects all tokens, stopping at the first error.
    pub fn tokenize(self) -> Result<Vec<PositionedToken>, LexError> {
        self.collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<PositionedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_token();
        if matches!(next, Some(Err(_))) {
            self.failed = true;
        }
        next
    }
}
