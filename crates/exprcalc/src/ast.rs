//! Abstract Syntax Tree (AST) for expressions.
//!
//! Node shapes follow the grammar one-to-one, so precedence is encoded by
//! nesting: an [`Expression`] is an `OR` list of [`OrCondition`]s, each of
//! which is an `AND` list of [`ConditionOperand`]s.
//!
//! Trees are immutable once built and hold no back-references, so a parsed
//! expression can be shared across threads and evaluated any number of times.

use std::fmt;

use serde::Serialize;

use crate::lexer::Position;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    /// Returns the operator's source form.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }

    /// Applies the operator to two ordered values.
    pub(crate) fn apply<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level node: operands joined by `OR`.
///
/// An expression with no conditions comes from empty input and evaluates
/// to "no value".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    /// Start of the expression.
    pub position: Position,
    /// The `OR`-joined conditions, in source order.
    pub conditions: Vec<OrCondition>,
}

/// Operands joined by `AND`; binds tighter than `OR`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrCondition {
    /// Start of the first operand.
    pub position: Position,
    /// The `AND`-joined operands, in source order. Never empty.
    pub operands: Vec<ConditionOperand>,
}

/// A term, optionally compared against a second term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionOperand {
    /// Start of the left-hand term.
    pub position: Position,
    /// The left-hand term.
    pub term: Term,
    /// The comparison, if any. Without one the operand is the term's value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare: Option<Compare>,
}

/// A comparison operator and its right-hand term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compare {
    /// Position of the operator.
    pub position: Position,
    /// The operator.
    pub operator: CompareOp,
    /// The right-hand term.
    pub term: Term,
}

/// A literal, an identifier, or a parenthesized sub-expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    /// Position of the term (for sub-expressions, the opening parenthesis).
    pub position: Position,
    /// What the term holds.
    pub kind: TermKind,
}

/// The three mutually exclusive shapes of a [`Term`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// A literal value.
    Literal(Literal),
    /// A name resolved through the evaluation context.
    Identifier(String),
    /// A parenthesized expression.
    SubExpression(Box<Expression>),
}

/// A literal value written in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// A number literal.
    Number(f64),
    /// A string literal, unquoted.
    Text(String),
    /// A `true` or `false` literal.
    Boolean(bool),
}

impl Expression {
    /// Creates the empty expression (no conditions).
    pub fn empty() -> Self {
        Self {
            position: Position::START,
            conditions: Vec::new(),
        }
    }

    /// Returns true if the expression has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the distinct identifier names used, in order of first appearance.
    ///
    /// # Example
    ///
    /// ```
    /// let expr = exprcalc_rs::parse("age > 18 AND (name == 'x' OR age < 3)").unwrap();
    /// assert_eq!(expr.identifiers(), vec!["age", "name"]);
    /// ```
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        for operand in self.conditions.iter().flat_map(|c| &c.operands) {
            operand.term.collect_identifiers(names);
            if let Some(compare) = &operand.compare {
                compare.term.collect_identifiers(names);
            }
        }
    }
}

impl Term {
    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            TermKind::Literal(_) => {}
            TermKind::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            TermKind::SubExpression(inner) => inner.collect_identifiers(names),
        }
    }
}

// ==================== Canonical rendering ====================

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.conditions, " OR ")
    }
}

impl fmt::Display for OrCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.operands, " AND ")
    }
}

impl fmt::Display for ConditionOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)?;
        if let Some(compare) = &self.compare {
            write!(f, " {compare}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Compare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.term)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TermKind::Literal(literal) => write!(f, "{literal}"),
            TermKind::Identifier(name) => f.write_str(name),
            TermKind::SubExpression(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Out-of-range literals overflow to infinity; keep them re-parseable.
            Literal::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "1e999" } else { "-1e999" })
            }
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Text(s) if s.contains('"') => write!(f, "'{s}'"),
            Literal::Text(s) => write!(f, "\"{s}\""),
            Literal::Boolean(b) => write!(f, "{b}"),
        }
    }
}
