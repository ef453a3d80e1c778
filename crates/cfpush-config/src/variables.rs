//! Variable interpolation for manifests.
//!
//! Placeholders are written `((name))` and resolved, in order, from:
//! - values set on the command line (`--var name=value`)
//! - vars files (`--vars-file vars.yml`), later files overriding earlier ones
//!
//! An unresolved placeholder is an error.

use regex::Regex;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use crate::{ConfigError, ConfigResult};

// Regex for matching ((...)) placeholders
static VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\(([a-zA-Z0-9_][a-zA-Z0-9_.\-]*)\)\)").unwrap());

/// Values available for manifest interpolation.
#[derive(Debug, Clone, Default)]
pub struct ManifestVariables {
    /// Set explicitly; win over files
    overrides: HashMap<String, String>,
    /// Loaded from vars files
    files: HashMap<String, String>,
}

impl ManifestVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable that takes precedence over any vars file.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.overrides.insert(name.to_string(), value.into());
    }

    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Parse a `name=value` pair as given on the command line.
    pub fn set_pair(&mut self, pair: &str) -> ConfigResult<()> {
        let (name, value) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            field: "var".to_string(),
            message: format!("expected name=value, got '{}'", pair),
        })?;
        if name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "var".to_string(),
                message: format!("empty variable name in '{}'", pair),
            });
        }
        self.set(name, value);
        Ok(())
    }

    /// Merge a YAML vars document (a flat mapping of scalars).
    pub fn merge_yaml(&mut self, yaml: &str) -> ConfigResult<()> {
        let vars: BTreeMap<String, Value> = serde_yaml::from_str(yaml)?;
        for (name, value) in vars {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: name,
                        message: "vars file values must be scalars".to_string(),
                    });
                }
            };
            self.files.insert(name, value);
        }
        Ok(())
    }

    /// Merge a vars file from disk.
    pub fn merge_file(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge_yaml(&content)
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(name)
            .or_else(|| self.files.get(name))
            .map(|s| s.as_str())
    }

    /// Substitute every `((name))` placeholder in `input`.
    pub fn interpolate(&self, input: &str) -> ConfigResult<String> {
        if let Some(missing) = self
            .placeholders(input)
            .into_iter()
            .find(|name| self.resolve(name).is_none())
        {
            return Err(ConfigError::UndefinedVariable(missing));
        }

        Ok(VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                self.resolve(&caps[1]).unwrap_or_default().to_string()
            })
            .to_string())
    }

    /// Names of all placeholders used in `input`, in order of appearance.
    pub fn placeholders(&self, input: &str) -> Vec<String> {
        VAR_REGEX
            .captures_iter(input)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}
