//! Tree-walking evaluation of parsed expressions.
//!
//! This module provides the [`Evaluator`], which reduces an [`Expression`]
//! to a single value under a [`Context`].
//!
//! # Type rules
//!
//! - Comparisons require both sides to have the same type. Numbers and
//!   strings support all six operators; booleans support only `==` and `!=`.
//! - `AND`/`OR` require boolean operands, except that a lone operand passes
//!   through unchanged.
//!
//! # Short-circuiting
//!
//! With exactly two operands, `true OR x` and `false AND x` return without
//! evaluating `x` at all, so `x` may even have the wrong type. With three or
//! more operands the fold evaluates and type-checks the next operand before
//! noticing the result is already decided, then stops. So `true OR 1 OR x` is a
//! type error while `true OR 1` is `true`.
//!
//! # Example
//!
//! ```
//! use exprcalc_rs::{Context, Evaluator, ExpressionParser, Value};
//!
//! let expr = ExpressionParser::parse("1 < 2 AND 'a' < 'b'").unwrap();
//! let evaluator = Evaluator::new(Context::empty());
//! assert_eq!(evaluator.evaluate(&expr).unwrap(), Some(Value::Boolean(true)));
//! ```

use std::fmt;

use crate::ast::{
    Compare, CompareOp, ConditionOperand, Expression, Literal, OrCondition, Term, TermKind,
};
use crate::context::Context;
use crate::error::{EvalError, EvalResult};
use crate::lexer::Position;
use crate::value::{Operand, Value};

/// A logical operator joining the children of an [`Expression`] or [`OrCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logic {
    And,
    Or,
}

impl Logic {
    /// The left-hand value that decides the result on its own.
    fn deciding_value(self) -> bool {
        match self {
            Logic::And => false,
            Logic::Or => true,
        }
    }

    fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Logic::And => lhs && rhs,
            Logic::Or => lhs || rhs,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::And => f.write_str("AND"),
            Logic::Or => f.write_str("OR"),
        }
    }
}

/// Evaluates parsed expressions against a context.
///
/// The evaluator holds no state besides the context, so one instance can
/// evaluate any number of expressions.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    context: Context<'a>,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator.
    pub fn new(context: Context<'a>) -> Self {
        Self { context }
    }

    /// Evaluates `expr` and maps the result to an external value.
    ///
    /// Returns `Ok(None)` for the empty expression.
    pub fn evaluate(&self, expr: &Expression) -> EvalResult<Option<Value>> {
        self.evaluate_raw(expr).map(Operand::into_external)
    }

    /// Evaluates `expr` to the internal tagged value.
    pub fn evaluate_raw(&self, expr: &Expression) -> EvalResult<Operand> {
        self.evaluate_expression(expr)
    }

    /// Reduces `OR`-joined conditions.
    fn evaluate_expression(&self, expr: &Expression) -> EvalResult<Operand> {
        let Some((first, rest)) = expr.conditions.split_first() else {
            return Ok(Operand::Empty);
        };

        let lhs = self.evaluate_or_condition(first)?;
        self.fold_logic(Logic::Or, expr.position, lhs, rest, |condition| {
            self.evaluate_or_condition(condition)
        })
    }

    /// Reduces `AND`-joined operands.
    fn evaluate_or_condition(&self, condition: &OrCondition) -> EvalResult<Operand> {
        let Some((first, rest)) = condition.operands.split_first() else {
            return Ok(Operand::Empty);
        };

        let lhs = self.evaluate_condition_operand(first)?;
        self.fold_logic(Logic::And, condition.position, lhs, rest, |operand| {
            self.evaluate_condition_operand(operand)
        })
    }

    /// Folds the remaining children of a logical node into `lhs`.
    ///
    /// `lhs` is the already-evaluated first child.
    fn fold_logic<T>(
        &self,
        logic: Logic,
        position: Position,
        mut lhs: Operand,
        rest: &[T],
        mut evaluate_child: impl FnMut(&T) -> EvalResult<Operand>,
    ) -> EvalResult<Operand> {
        let deciding = logic.deciding_value();

        // Two operands: a deciding lhs skips the right side entirely.
        if rest.len() == 1 && lhs == Operand::Boolean(deciding) {
            return Ok(lhs);
        }

        for child in rest {
            let rhs = evaluate_child(child)?;

            let (lhs_bool, rhs_bool) = match (&lhs, &rhs) {
                (Operand::Boolean(l), Operand::Boolean(r)) => (*l, *r),
                (Operand::Boolean(_), other) => {
                    return Err(EvalError::type_mismatch(
                        position,
                        format!(
                            "right operand of {logic} must be boolean, found {}",
                            other.type_name()
                        ),
                    ))
                }
                (other, _) => {
                    return Err(EvalError::type_mismatch(
                        position,
                        format!(
                            "left operand of {logic} must be boolean, found {}",
                            other.type_name()
                        ),
                    ))
                }
            };

            // The child above was evaluated even though lhs already decided
            // the result; only later children are skipped.
            if lhs_bool == deciding {
                break;
            }
            lhs = Operand::Boolean(logic.apply(lhs_bool, rhs_bool));
        }

        Ok(lhs)
    }

    /// Evaluates a term and its optional comparison.
    fn evaluate_condition_operand(&self, operand: &ConditionOperand) -> EvalResult<Operand> {
        let lhs = self.evaluate_term(&operand.term)?;

        match &operand.compare {
            Some(compare) => self.evaluate_compare(lhs, compare),
            None => Ok(lhs),
        }
    }

    /// Compares `lhs` with the comparison's right-hand term.
    ///
    /// Dispatch is on the left operand's type; the right operand must match it.
    fn evaluate_compare(&self, lhs: Operand, compare: &Compare) -> EvalResult<Operand> {
        let rhs = self.evaluate_term(&compare.term)?;
        let op = compare.operator;
        let mismatch = |expected: &str, found: &Operand| {
            EvalError::type_mismatch(
                compare.position,
                format!(
                    "right operand of `{op}` must be {expected}, found {}",
                    found.type_name()
                ),
            )
        };

        let result = match (&lhs, &rhs) {
            (Operand::Number(l), Operand::Number(r)) => op.apply(l, r),
            (Operand::Number(_), other) => return Err(mismatch("a number", other)),

            (Operand::Text(l), Operand::Text(r)) => op.apply(l.as_str(), r.as_str()),
            (Operand::Text(_), other) => return Err(mismatch("a string", other)),

            (Operand::Boolean(l), Operand::Boolean(r)) => match op {
                CompareOp::Eq => l == r,
                CompareOp::Ne => l != r,
                CompareOp::Lt | CompareOp::Gt | CompareOp::Le | CompareOp::Ge => {
                    return Err(EvalError::type_mismatch(
                        compare.position,
                        format!("unsupported boolean comparison operator `{op}`"),
                    ))
                }
            },
            (Operand::Boolean(_), other) => return Err(mismatch("a boolean", other)),

            (Operand::Empty | Operand::Opaque(_), _) => {
                return Err(EvalError::type_mismatch(
                    compare.position,
                    format!(
                        "left operand of `{op}` must be a number, string, or boolean, found {}",
                        lhs.type_name()
                    ),
                ))
            }
        };

        Ok(Operand::Boolean(result))
    }

    /// Evaluates a literal, identifier or sub-expression.
    fn evaluate_term(&self, term: &Term) -> EvalResult<Operand> {
        match &term.kind {
            TermKind::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Operand::Number(*n),
                Literal::Text(s) => Operand::Text(s.clone()),
                Literal::Boolean(b) => Operand::Boolean(*b),
            }),

            TermKind::Identifier(name) => {
                let resolver = self.context.resolver().ok_or_else(|| EvalError::Context {
                    position: term.position,
                    name: name.clone(),
                })?;
                resolver
                    .resolve(name)
                    .map(Operand::from)
                    .map_err(|source| EvalError::Identifier {
                        position: term.position,
                        name: name.clone(),
                        source,
                    })
            }

            TermKind::SubExpression(inner) => self.evaluate_expression(inner),
        }
    }
}

impl Expression {
    /// Evaluates this expression against `context`.
    ///
    /// The tree is not modified, so the same expression can be evaluated
    /// repeatedly with different contexts.
    pub fn evaluate(&self, context: &Context<'_>) -> EvalResult<Option<Value>> {
        Evaluator::new(*context).evaluate(self)
    }
}
