//! Evaluation context and the host name-resolution capability.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use strsim::levenshtein;

use crate::error::ResolveError;
use crate::value::HostValue;

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Resolves identifiers to host values during evaluation.
///
/// The returned value should convert to a number, string or boolean; any
/// other kind (see [`HostValue::Opaque`]) is accepted but fails at its first
/// comparison.
///
/// Ready-made implementations exist for `HashMap<String, V>`,
/// `BTreeMap<String, V>` and `serde_json::Map`, and [`FnResolver`] adapts
/// a closure.
pub trait Resolve {
    /// Returns the value bound to `name`, or an error if it has none.
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError>;
}

impl<T: Resolve + ?Sized> Resolve for &T {
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        (**self).resolve(name)
    }
}

impl<T: Resolve + ?Sized> Resolve for Box<T> {
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        (**self).resolve(name)
    }
}

impl<T: Resolve + ?Sized> Resolve for Rc<T> {
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        (**self).resolve(name)
    }
}

impl<T: Resolve + ?Sized> Resolve for Arc<T> {
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        (**self).resolve(name)
    }
}

impl<V, S> Resolve for HashMap<String, V, S>
where
    V: Clone + Into<HostValue>,
    S: BuildHasher,
{
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        match self.get(name) {
            Some(value) => Ok(value.clone().into()),
            None => Err(UnknownIdentifier::new(name, self.keys().map(String::as_str)).into()),
        }
    }
}

impl<V> Resolve for BTreeMap<String, V>
where
    V: Clone + Into<HostValue>,
{
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        match self.get(name) {
            Some(value) => Ok(value.clone().into()),
            None => Err(UnknownIdentifier::new(name, self.keys().map(String::as_str)).into()),
        }
    }
}

impl Resolve for serde_json::Map<String, serde_json::Value> {
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        match self.get(name) {
            Some(value) => Ok(value.clone().into()),
            None => Err(UnknownIdentifier::new(name, self.keys().map(String::as_str)).into()),
        }
    }
}

/// Adapts a closure into a [`Resolve`] implementation.
///
/// # Example
///
/// ```
/// use exprcalc_rs::{eval, FnResolver, HostValue, Value};
///
/// let resolver = FnResolver::new(|name| match name {
///     "age" => Ok(HostValue::from(22)),
///     _ => Err(format!("unknown identifier `{name}`").into()),
/// });
/// assert_eq!(eval("age > 18", Some(&resolver)).unwrap(), Some(Value::Boolean(true)));
/// ```
pub struct FnResolver<F>(pub F);

impl<F> FnResolver<F>
where
    F: Fn(&str) -> Result<HostValue, ResolveError>,
{
    /// Wraps `f` as a resolver.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Resolve for FnResolver<F>
where
    F: Fn(&str) -> Result<HostValue, ResolveError>,
{
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        (self.0)(name)
    }
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnResolver(..)")
    }
}

/// Formats the "unknown identifier" message, optionally including a suggestion.
fn format_unknown_identifier(name: &str, suggestion: Option<&str>) -> String {
    let base = format!("unknown identifier `{name}`");
    match suggestion {
        Some(s) => format!("{base}. Did you mean `{s}`?"),
        None => base,
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Identifiers are case-sensitive, so the comparison is too. Returns the best
/// match if its edit distance is within the threshold, otherwise `None`.
fn find_similar_name<'a>(query: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| (name, levenshtein(query, name)))
        .min_by_key(|(_, d)| *d)?;

    // Only suggest if the distance is within threshold and not an exact match
    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.to_string())
    } else {
        None
    }
}

/// Error returned by the built-in resolvers for a name they do not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", format_unknown_identifier(name, suggestion.as_deref()))]
pub struct UnknownIdentifier {
    /// The name that was looked up.
    pub name: String,
    /// The closest known name, if any is close enough.
    pub suggestion: Option<String>,
}

impl UnknownIdentifier {
    /// Creates the error, picking a suggestion among `known` names.
    pub fn new<'a>(name: &str, known: impl Iterator<Item = &'a str>) -> Self {
        Self {
            name: name.to_string(),
            suggestion: find_similar_name(name, known),
        }
    }
}

/// Per-evaluation context: an optional name resolver.
///
/// Without a resolver, any identifier in the expression is an error.
#[derive(Clone, Copy, Default)]
pub struct Context<'a> {
    resolver: Option<&'a dyn Resolve>,
}

impl<'a> Context<'a> {
    /// Creates a context that resolves identifiers through `resolver`.
    pub fn new(resolver: &'a dyn Resolve) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    /// Creates a context with no resolver.
    pub fn empty() -> Self {
        Self { resolver: None }
    }

    /// Returns the resolver, if any.
    pub fn resolver(&self) -> Option<&'a dyn Resolve> {
        self.resolver
    }
}

impl<'a> From<Option<&'a dyn Resolve>> for Context<'a> {
    fn from(resolver: Option<&'a dyn Resolve>) -> Self {
        Self { resolver }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}
