//! Variable sources for the eval command.
//!
//! Variables come from three places, later ones overriding earlier ones:
//! the `[variables]` table of the config file, a `--vars` file, and
//! individual `--var name=value` flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use exprcalc_rs::lexer::Token;
use exprcalc_rs::{HostValue, Lexer, Resolve, ResolveError};

use super::{CommandError, Result};

/// Named variables bound for one evaluation.
pub type Variables = BTreeMap<String, HostValue>;

/// Parses a `--var` argument of the form `name=value`.
///
/// The value is typed by literal syntax: `true`/`false` in any case become
/// booleans, numeric literals become numbers, quoted strings lose their
/// quotes, and anything else is taken as text verbatim.
pub fn parse_var(s: &str) -> std::result::Result<(String, HostValue), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid variable `{s}`: expected NAME=VALUE"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid variable `{s}`: name is empty"));
    }

    Ok((name.to_string(), literal_value(value)))
}

/// Types a raw value by reading it as a single expression literal.
fn literal_value(raw: &str) -> HostValue {
    let tokens: std::result::Result<Vec<_>, _> = Lexer::new(raw).collect();
    match tokens.as_deref() {
        Ok([single]) => match &single.token {
            Token::Boolean(b) => HostValue::Boolean(*b),
            Token::Number(n) => HostValue::Number(*n),
            Token::String(s) => HostValue::Text(s.clone()),
            _ => HostValue::Text(raw.to_string()),
        },
        _ => HostValue::Text(raw.to_string()),
    }
}

/// Converts a TOML value, accepting scalars only.
pub fn host_value_from_toml(name: &str, value: &toml::Value) -> Result<HostValue> {
    match value {
        toml::Value::String(s) => Ok(HostValue::Text(s.clone())),
        toml::Value::Integer(i) => Ok(HostValue::from(*i)),
        toml::Value::Float(f) => Ok(HostValue::Number(*f)),
        toml::Value::Boolean(b) => Ok(HostValue::Boolean(*b)),
        other => Err(non_scalar(name, other.type_str())),
    }
}

/// Converts a JSON value, accepting scalars only.
pub fn host_value_from_json(name: &str, value: &serde_json::Value) -> Result<HostValue> {
    match value {
        serde_json::Value::String(_)
        | serde_json::Value::Number(_)
        | serde_json::Value::Bool(_) => Ok(HostValue::from(value.clone())),
        serde_json::Value::Null => Err(non_scalar(name, "null")),
        serde_json::Value::Array(_) => Err(non_scalar(name, "array")),
        serde_json::Value::Object(_) => Err(non_scalar(name, "object")),
    }
}

fn non_scalar(name: &str, kind: &str) -> CommandError {
    CommandError::Config(format!(
        "variable '{}' must be a string, number or boolean, found {}",
        name, kind
    ))
}

/// Loads variables from a `.json` or `.toml` file.
///
/// The file must hold a single object/table of scalar values.
pub fn load_vars_file(path: &Path) -> Result<Variables> {
    let content = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let table: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&content).map_err(|e| {
                    CommandError::Config(format!(
                        "Failed to parse variables file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            table
                .iter()
                .map(|(name, value)| Ok((name.clone(), host_value_from_json(name, value)?)))
                .collect()
        }
        Some("toml") => {
            let table: toml::Table = toml::from_str(&content).map_err(|e| {
                CommandError::Config(format!(
                    "Failed to parse variables file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            table
                .iter()
                .map(|(name, value)| Ok((name.clone(), host_value_from_toml(name, value)?)))
                .collect()
        }
        _ => Err(CommandError::Config(format!(
            "Unsupported variables file {}: expected a .json or .toml extension",
            path.display()
        ))),
    }
}

/// Resolves identifiers from a variable table, logging lookups when verbose.
#[derive(Debug, Default)]
pub struct VariableResolver {
    variables: Variables,
    verbose: bool,
}

impl VariableResolver {
    pub fn new(variables: Variables, verbose: bool) -> Self {
        Self { variables, verbose }
    }
}

impl Resolve for VariableResolver {
    fn resolve(&self, name: &str) -> std::result::Result<HostValue, ResolveError> {
        let result = self.variables.resolve(name);
        if self.verbose {
            match &result {
                Ok(value) => eprintln!("Resolved {name} = {value:?}"),
                Err(e) => eprintln!("Failed to resolve {name}: {e}"),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_var_types_literals() {
        assert_eq!(
            parse_var("age=22").unwrap(),
            ("age".to_string(), HostValue::Number(22.0))
        );
        assert_eq!(
            parse_var("ratio=-1.5e2").unwrap().1,
            HostValue::Number(-150.0)
        );
        assert_eq!(parse_var("ok=TRUE").unwrap().1, HostValue::Boolean(true));
        assert_eq!(parse_var("ok=false").unwrap().1, HostValue::Boolean(false));
        assert_eq!(
            parse_var("name=bob").unwrap().1,
            HostValue::Text("bob".to_string())
        );
        assert_eq!(
            parse_var("name='22'").unwrap().1,
            HostValue::Text("22".to_string())
        );
        assert_eq!(
            parse_var("name=\"true\"").unwrap().1,
            HostValue::Text("true".to_string())
        );
    }

    #[test]
    fn test_parse_var_keeps_odd_text_verbatim() {
        assert_eq!(
            parse_var("msg=hello world").unwrap().1,
            HostValue::Text("hello world".to_string())
        );
        assert_eq!(
            parse_var("msg=a=b").unwrap().1,
            HostValue::Text("a=b".to_string())
        );
        assert_eq!(parse_var("msg=").unwrap().1, HostValue::Text(String::new()));
        assert_eq!(
            parse_var("msg=1.2.3").unwrap().1,
            HostValue::Text("1.2.3".to_string())
        );
    }

    #[test]
    fn test_parse_var_errors() {
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=1").is_err());
        assert!(parse_var("  =1").is_err());
    }

    #[test]
    fn test_host_value_from_toml() {
        assert_eq!(
            host_value_from_toml("n", &toml::Value::Integer(3)).unwrap(),
            HostValue::Number(3.0)
        );
        assert!(matches!(
            host_value_from_toml("n", &toml::Value::Array(vec![])),
            Err(CommandError::Config(_))
        ));
    }

    #[test]
    fn test_host_value_from_json_rejects_null() {
        let err = host_value_from_json("x", &serde_json::Value::Null).unwrap_err();
        assert!(err.to_string().contains("variable 'x'"));
    }

    #[test]
    fn test_load_vars_file_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vars.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"age": 22, "name": "bob", "admin": false}}"#).unwrap();

        let vars = load_vars_file(&path).unwrap();
        assert_eq!(vars["age"], HostValue::Number(22.0));
        assert_eq!(vars["name"], HostValue::Text("bob".to_string()));
        assert_eq!(vars["admin"], HostValue::Boolean(false));
    }

    #[test]
    fn test_load_vars_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vars.toml");
        fs::write(&path, "age = 22\nname = \"bob\"\nscore = 0.5\n").unwrap();

        let vars = load_vars_file(&path).unwrap();
        assert_eq!(vars["age"], HostValue::Number(22.0));
        assert_eq!(vars["score"], HostValue::Number(0.5));
    }

    #[test]
    fn test_load_vars_file_errors() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_vars_file(&missing), Err(CommandError::Io(_))));

        let yaml = dir.path().join("vars.yaml");
        fs::write(&yaml, "age: 22").unwrap();
        assert!(matches!(load_vars_file(&yaml), Err(CommandError::Config(_))));

        let nested = dir.path().join("nested.json");
        fs::write(&nested, r#"{"tags": ["a"]}"#).unwrap();
        assert!(matches!(load_vars_file(&nested), Err(CommandError::Config(_))));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "age = ").unwrap();
        assert!(matches!(load_vars_file(&broken), Err(CommandError::Config(_))));
    }

    #[test]
    fn test_variable_resolver_suggests_names() {
        let resolver = VariableResolver::new(
            Variables::from([("height".to_string(), HostValue::Number(1.8))]),
            false,
        );
        assert_eq!(resolver.resolve("height").unwrap(), HostValue::Number(1.8));
        let err = resolver.resolve("heigth").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown identifier `heigth`. Did you mean `height`?"
        );
    }
}
