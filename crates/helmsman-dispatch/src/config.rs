//! Configuration values for flags.
//!
//! A [`ConfigSource`] answers "is there a configured value for this flag of
//! this command?". It sits between the environment and flag defaults in the
//! precedence order. Loading configuration files is left to the application;
//! this module only looks values up.

use std::collections::HashMap;

/// Lookup of configured flag values.
pub trait ConfigSource {
    /// The configured value of `flag` for the command at `command_path`
    /// (names below the root), if any.
    fn lookup(&self, command_path: &[String], flag: &str) -> Option<serde_json::Value>;
}

impl<C: ConfigSource + ?Sized> ConfigSource for &C {
    fn lookup(&self, command_path: &[String], flag: &str) -> Option<serde_json::Value> {
        (**self).lookup(command_path, flag)
    }
}

impl<C: ConfigSource + ?Sized> ConfigSource for Box<C> {
    fn lookup(&self, command_path: &[String], flag: &str) -> Option<serde_json::Value> {
        (**self).lookup(command_path, flag)
    }
}

/// No configuration at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoConfig;

impl ConfigSource for NoConfig {
    fn lookup(&self, _command_path: &[String], _flag: &str) -> Option<serde_json::Value> {
        None
    }
}

/// A flat map of string values.
///
/// Keys are flag names, optionally qualified by a dotted command path:
/// `"db.migrate.url"` applies to `db migrate` only and wins over `"db.url"`,
/// which wins over `"url"`.
#[derive(Debug, Default, Clone)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapConfig {
    fn lookup(&self, command_path: &[String], flag: &str) -> Option<serde_json::Value> {
        (0..=command_path.len()).rev().find_map(|depth| {
            let key = command_path[..depth]
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(flag))
                .collect::<Vec<_>>()
                .join(".");
            self.values
                .get(&key)
                .map(|v| serde_json::Value::String(v.clone()))
        })
    }
}

/// A JSON document.
///
/// Top-level keys are root flags; nested objects keyed by subcommand names
/// scope values to those commands. The deepest section that defines the flag
/// wins.
///
/// ```
/// use helmsman_dispatch::ConfigSource;
/// use serde_json::json;
///
/// let config = json!({
///     "verbose": true,
///     "db": { "url": "postgres://localhost", "migrate": { "url": "postgres://migrations" } }
/// });
/// let path = ["db".to_string(), "migrate".to_string()];
/// assert_eq!(config.lookup(&path, "url"), Some(json!("postgres://migrations")));
/// assert_eq!(config.lookup(&path, "verbose"), Some(json!(true)));
/// ```
impl ConfigSource for serde_json::Value {
    fn lookup(&self, command_path: &[String], flag: &str) -> Option<serde_json::Value> {
        let mut sections = vec![self];
        let mut current = self;
        for name in command_path {
            match current.get(name.as_str()) {
                Some(section) if section.is_object() => {
                    sections.push(section);
                    current = section;
                }
                _ => break,
            }
        }
        sections
            .into_iter()
            .rev()
            .find_map(|section| section.get(flag).filter(|v| !v.is_object() && !v.is_null()))
            .cloned()
    }
}
