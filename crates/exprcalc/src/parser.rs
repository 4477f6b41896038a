//! Recursive descent parser for expressions.

use std::str::FromStr;

use crate::ast::{Compare, ConditionOperand, Expression, Literal, OrCondition, Term, TermKind};
use crate::error::{ParseError, ParseResult, SyntaxError};
use crate::lexer::{Lexer, Position, PositionedToken, Token};

const EXPECTED_TERM: &str = "a literal, identifier or `(`";
const EXPECTED_CLOSE_PAREN: &str = "`)`";

/// Parser for expressions.
///
/// # Grammar
///
/// ```text
/// expression ::= or_cond ("OR" or_cond)*
/// or_cond    ::= operand ("AND" operand)*
/// operand    ::= term [compare_op term]
/// term       ::= literal | identifier | "(" expression ")"
/// literal    ::= number | string | boolean
/// compare_op ::= "==" | "!=" | "<" | ">" | "<=" | ">="
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `(...)`, literals, identifiers
/// 2. comparison operators (at most one per operand, non-associative)
/// 3. `AND` - left-associative
/// 4. `OR` - left-associative
///
/// The parser does no type checking: `"a" < 1` parses fine and only fails
/// when evaluated.
///
/// Parentheses may nest at most [`MAX_NESTING_DEPTH`](Self::MAX_NESTING_DEPTH)
/// levels deep. Deeper input fails with [`SyntaxError::NestingTooDeep`], which
/// also bounds the recursion of everything that walks a parsed tree.
///
/// # Example
///
/// ```
/// use exprcalc_rs::ExpressionParser;
///
/// let expr = ExpressionParser::parse("age >= 18 AND member").unwrap();
/// assert_eq!(expr.conditions.len(), 1);
/// assert_eq!(expr.conditions[0].operands.len(), 2);
/// ```
pub struct ExpressionParser {
    tokens: Vec<PositionedToken>,
    position: usize,
    /// Position just past the last character of the input.
    end: Position,
    /// Number of currently open parentheses.
    depth: usize,
}

impl ExpressionParser {
    /// Maximum number of nested parentheses.
    pub const MAX_NESTING_DEPTH: usize = 256;

    /// Parses an expression string into an [`Expression`] AST.
    ///
    /// Empty or whitespace-only input yields the empty expression.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Lex` if the text contains a character sequence no
    /// token matches, and `ParseError::Syntax` if the tokens do not follow
    /// the grammar.
    pub fn parse(input: &str) -> ParseResult<Expression> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.by_ref().collect::<Result<Vec<_>, _>>()?;
        if tokens.is_empty() {
            return Ok(Expression::empty());
        }

        let mut parser = Self {
            tokens,
            position: 0,
            end: lexer.position(),
            depth: 0,
        };
        let expression = parser.parse_expression()?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek() {
            return Err(SyntaxError::TrailingInput {
                position: remaining.position,
                found: remaining.token.to_string(),
            }
            .into());
        }

        Ok(expression)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &Token) -> bool {
        self.peek().is_some_and(|pt| &pt.token == expected)
    }

    /// Position of the current token, or end of input.
    fn current_position(&self) -> Position {
        self.peek().map_or(self.end, |pt| pt.position)
    }

    /// Parses `or_cond ("OR" or_cond)*`.
    fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        let position = self.current_position();
        let mut conditions = vec![self.parse_or_condition()?];

        while self.check(&Token::Or) {
            self.advance(); // consume 'OR'
            conditions.push(self.parse_or_condition()?);
        }

        Ok(Expression {
            position,
            conditions,
        })
    }

    /// Parses `operand ("AND" operand)*`.
    fn parse_or_condition(&mut self) -> Result<OrCondition, SyntaxError> {
        let position = self.current_position();
        let mut operands = vec![self.parse_operand()?];

        while self.check(&Token::And) {
            self.advance(); // consume 'AND'
            operands.push(self.parse_operand()?);
        }

        Ok(OrCondition { position, operands })
    }

    /// Parses `term [compare_op term]`.
    fn parse_operand(&mut self) -> Result<ConditionOperand, SyntaxError> {
        let position = self.current_position();
        let term = self.parse_term()?;

        let compare = match self.peek() {
            Some(PositionedToken {
                token: Token::Compare(operator),
                position,
            }) => {
                let (operator, position) = (*operator, *position);
                self.advance(); // consume operator
                Some(Compare {
                    position,
                    operator,
                    term: self.parse_term()?,
                })
            }
            _ => None,
        };

        Ok(ConditionOperand {
            position,
            term,
            compare,
        })
    }

    /// Parses `literal | identifier | "(" expression ")"`.
    fn parse_term(&mut self) -> Result<Term, SyntaxError> {
        let PositionedToken { token, position } =
            self.advance().ok_or(SyntaxError::UnexpectedEndOfInput {
                position: self.end,
                expected: EXPECTED_TERM,
            })?;

        let kind = match token {
            Token::Number(n) => TermKind::Literal(Literal::Number(n)),
            Token::String(s) => TermKind::Literal(Literal::Text(s)),
            Token::Boolean(b) => TermKind::Literal(Literal::Boolean(b)),
            Token::Identifier(name) => TermKind::Identifier(name),

            // Parenthesized expression
            Token::OpenParen => {
                if self.check(&Token::CloseParen) {
                    return Err(SyntaxError::EmptySubExpression { position });
                }
                if self.depth >= Self::MAX_NESTING_DEPTH {
                    return Err(SyntaxError::NestingTooDeep { position });
                }
                self.depth += 1;
                let inner = self.parse_expression()?;
                match self.advance() {
                    Some(PositionedToken {
                        token: Token::CloseParen,
                        ..
                    }) => {}
                    Some(other) => {
                        return Err(SyntaxError::unexpected(
                            other.position,
                            other.token,
                            EXPECTED_CLOSE_PAREN,
                        ))
                    }
                    None => return Err(SyntaxError::UnclosedParenthesis { position }),
                }
                self.depth -= 1;
                TermKind::SubExpression(Box::new(inner))
            }

            // Unexpected tokens
            other @ (Token::And | Token::Or | Token::Compare(_) | Token::CloseParen) => {
                return Err(SyntaxError::unexpected(position, other, EXPECTED_TERM))
            }
        };

        Ok(Term { position, kind })
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpressionParser::parse(s)
    }
}
