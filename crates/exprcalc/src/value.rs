//! Values crossing the evaluator boundary.
//!
//! - [`HostValue`] is what a [`Resolve`](crate::Resolve) implementation
//!   hands back for an identifier.
//! - [`Operand`] is the evaluator's closed internal representation.
//! - [`Value`] is the final result returned to the caller.
//!
//! Ingestion normalizes every host numeric type to `f64`; externalization
//! maps "no value" to `None`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The result of evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean.
    Boolean(bool),
    /// A number, always held as a double.
    Number(f64),
    /// A string.
    Text(String),
}

impl Value {
    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// A value produced by the host for an identifier.
///
/// Anything convertible with `From` works as a resolver return value:
///
/// ```
/// use exprcalc_rs::HostValue;
///
/// assert_eq!(HostValue::from(42u8), HostValue::Number(42.0));
/// assert_eq!(HostValue::from(-3i64), HostValue::Number(-3.0));
/// assert_eq!(HostValue::from("x"), HostValue::Text("x".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// A boolean.
    Boolean(bool),
    /// Any host number, normalized to a double.
    Number(f64),
    /// A string.
    Text(String),
    /// A value of some other type, described for error messages.
    ///
    /// Opaque values pass through logic operators and bare positions but
    /// fail in any comparison.
    Opaque(String),
}

impl HostValue {
    /// Creates an opaque value with a short description of its type.
    pub fn opaque(description: impl Into<String>) -> Self {
        HostValue::Opaque(description.into())
    }
}

macro_rules! host_number_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for HostValue {
                fn from(n: $t) -> Self {
                    HostValue::Number(n as f64)
                }
            }
        )*
    };
}

host_number_from!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Boolean(b)
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Text(s)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Text(s.to_string())
    }
}

impl From<char> for HostValue {
    fn from(c: char) -> Self {
        HostValue::Text(c.to_string())
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Boolean(b) => HostValue::Boolean(b),
            Value::Number(n) => HostValue::Number(n),
            Value::Text(s) => HostValue::Text(s),
        }
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => HostValue::Boolean(b),
            // Every JSON number has an f64 reading
            serde_json::Value::Number(n) => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => HostValue::Text(s),
            serde_json::Value::Null => HostValue::opaque("null"),
            serde_json::Value::Array(_) => HostValue::opaque("array"),
            serde_json::Value::Object(_) => HostValue::opaque("object"),
        }
    }
}

/// The evaluator's internal tagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No value: the result of an empty expression.
    Empty,
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
    /// A boolean.
    Boolean(bool),
    /// A host value of an unsupported type.
    Opaque(String),
}

impl Operand {
    /// Maps the internal result to what the caller sees.
    ///
    /// `Empty` and `Opaque` both become `None`.
    pub fn into_external(self) -> Option<Value> {
        match self {
            Operand::Boolean(b) => Some(Value::Boolean(b)),
            Operand::Number(n) => Some(Value::Number(n)),
            Operand::Text(s) => Some(Value::Text(s)),
            Operand::Empty | Operand::Opaque(_) => None,
        }
    }

    /// Returns a short type name for error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Operand::Empty => "no value",
            Operand::Number(_) => "number",
            Operand::Text(_) => "string",
            Operand::Boolean(_) => "boolean",
            Operand::Opaque(description) => description,
        }
    }
}

impl From<HostValue> for Operand {
    fn from(value: HostValue) -> Self {
        match value {
            HostValue::Boolean(b) => Operand::Boolean(b),
            HostValue::Number(n) => Operand::Number(n),
            HostValue::Text(s) => Operand::Text(s),
            HostValue::Opaque(description) => Operand::Opaque(description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_normalize_to_f64() {
        assert_eq!(HostValue::from(7i8), HostValue::Number(7.0));
        assert_eq!(HostValue::from(u64::MAX), HostValue::Number(u64::MAX as f64));
        assert_eq!(HostValue::from(-12isize), HostValue::Number(-12.0));
        assert_eq!(HostValue::from(1.5f32), HostValue::Number(1.5));
    }

    #[test]
    fn test_json_values() {
        assert_eq!(HostValue::from(json!(true)), HostValue::Boolean(true));
        assert_eq!(HostValue::from(json!(22)), HostValue::Number(22.0));
        assert_eq!(HostValue::from(json!("male")), HostValue::Text("male".into()));
        assert_eq!(HostValue::from(json!(null)), HostValue::opaque("null"));
        assert_eq!(HostValue::from(json!([1, 2])), HostValue::opaque("array"));
    }

    #[test]
    fn test_into_external() {
        assert_eq!(Operand::Empty.into_external(), None);
        assert_eq!(Operand::Opaque("map".into()).into_external(), None);
        assert_eq!(
            Operand::Boolean(true).into_external(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            Operand::Text("a".into()).into_external(),
            Some(Value::Text("a".into()))
        );
    }

    #[test]
    fn test_value_serde_untagged() {
        assert_eq!(serde_json::to_string(&Value::Number(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Value::Boolean(false)).unwrap(), "false");
        let parsed: Value = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(parsed, Value::Text("x".into()));
    }
}
