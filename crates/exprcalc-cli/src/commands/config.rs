//! Config command implementation.
//!
//! View configuration settings.
//! Config file is located at ~/.config/exprcalc/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::vars::{host_value_from_toml, Variables};
use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "EXPRCALC_CONFIG";

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Default variables for `eval`, overridden by `--vars` and `--var`.
    #[serde(default)]
    pub variables: toml::Table,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
            variables: toml::Table::new(),
        }
    }
}

impl Config {
    /// Returns the `[variables]` table as host values.
    ///
    /// Only strings, numbers and booleans are accepted.
    pub fn variables(&self) -> Result<Variables> {
        self.variables
            .iter()
            .map(|(name, value)| Ok((name.clone(), host_value_from_toml(name, value)?)))
            .collect()
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config file path.
///
/// Resolution order: `$EXPRCALC_CONFIG`, `$XDG_CONFIG_HOME/exprcalc/config.toml`,
/// then `~/.config/exprcalc/config.toml` on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config)
            .join("exprcalc")
            .join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| {
            dirs.home_dir()
                .join(".config")
                .join("exprcalc")
                .join("config.toml")
        })
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
///
/// A missing file gives the default configuration.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    parse_config(&content)
}

/// Parses and validates config file contents.
fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Unsupported config version {} (this build supports up to {})",
            config.version, CONFIG_VERSION
        )));
    }
    config.variables()?;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }

            println!("\n[variables]");
            for (name, value) in &config.variables {
                println!("  {} = {}", name, value);
            }
        } else {
            println!("(No config file exists.)");
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprcalc_rs::HostValue;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Runs `f` with the given config-related env vars, restoring them after.
    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        let saved: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(key, _)| (key.to_string(), env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.output.color.is_none());
        assert!(config.variables.is_empty());
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config = parse_config("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.variables().unwrap().is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let config = parse_config(
            r#"
version = 1

[output]
color = false

[variables]
age = 22
name = "bob"
admin = true
ratio = 0.25
"#,
        )
        .unwrap();

        assert_eq!(config.output.color, Some(false));
        let vars = config.variables().unwrap();
        assert_eq!(vars["age"], HostValue::Number(22.0));
        assert_eq!(vars["name"], HostValue::Text("bob".to_string()));
        assert_eq!(vars["admin"], HostValue::Boolean(true));
        assert_eq!(vars["ratio"], HostValue::Number(0.25));
    }

    #[test]
    fn test_config_rejects_non_scalar_variables() {
        let err = parse_config("[variables]\ntags = [\"a\", \"b\"]\n").unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
        assert!(err.to_string().contains("tags"));

        let err = parse_config("[variables.nested]\nx = 1\n").unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
    }

    #[test]
    fn test_config_rejects_future_version() {
        let err = parse_config("version = 99\n").unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_config_keeps_declared_version() {
        let config = parse_config("version = 0\n").unwrap();
        assert_eq!(config.version, 0);
        assert_eq!(parse_config("version = 1\n").unwrap().version, 1);
    }

    #[test]
    fn test_config_parse_error() {
        assert!(matches!(
            parse_config("[output\n"),
            Err(CommandError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        let path = with_env(
            &[(CONFIG_ENV_VAR, Some("/tmp/exprcalc-test/custom.toml"))],
            get_config_path,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/exprcalc-test/custom.toml"));
    }

    #[test]
    #[serial]
    fn test_config_path_xdg() {
        let path = with_env(
            &[(CONFIG_ENV_VAR, None), ("XDG_CONFIG_HOME", Some("/tmp/xdg"))],
            get_config_path,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/xdg/exprcalc/config.toml"));
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let config = with_env(&[(CONFIG_ENV_VAR, missing.to_str())], load_config).unwrap();
        assert!(config.variables.is_empty());
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[variables]\nlimit = 10\n").unwrap();

        let config = with_env(&[(CONFIG_ENV_VAR, path.to_str())], load_config).unwrap();
        assert_eq!(
            config.variables().unwrap()["limit"],
            HostValue::Number(10.0)
        );
    }
}
