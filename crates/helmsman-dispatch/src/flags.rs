//! Typed flag definitions and resolved flag values.
//!
//! A [`Flag`] declares how a value is spelled on the command line, what kind
//! of value it is, and where else it may come from. Resolution produces a
//! [`FlagValues`] map keyed by each flag's destination, where every entry
//! remembers its [`ValueSource`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of value kinds a flag may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl FlagKind {
    /// Parse a literal into a value of this kind.
    ///
    /// Returns `None` when the literal is not a valid spelling. Nothing is
    /// coerced silently: `"8O80"` is not an integer and `"maybe"` is not a
    /// boolean.
    pub fn parse(self, literal: &str) -> Option<Value> {
        match self {
            FlagKind::String => Some(Value::Str(literal.to_string())),
            FlagKind::Integer => literal.parse::<i64>().ok().map(Value::Int),
            FlagKind::Float => literal
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            FlagKind::Boolean => parse_bool(literal).map(Value::Bool),
        }
    }

    /// Convert a configuration value into a value of this kind.
    ///
    /// Strings go through [`parse`](Self::parse); JSON numbers and booleans
    /// are accepted when they already have the right shape.
    pub fn from_json(self, json: &serde_json::Value) -> Option<Value> {
        match (self, json) {
            (_, serde_json::Value::String(s)) => self.parse(s),
            (FlagKind::Integer, serde_json::Value::Number(n)) => n.as_i64().map(Value::Int),
            (FlagKind::Float, serde_json::Value::Number(n)) => n.as_f64().map(Value::Float),
            (FlagKind::Boolean, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
            (FlagKind::String, serde_json::Value::Number(n)) => Some(Value::Str(n.to_string())),
            (FlagKind::String, serde_json::Value::Bool(b)) => Some(Value::Str(b.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::String => write!(f, "string"),
            FlagKind::Integer => write!(f, "integer"),
            FlagKind::Float => write!(f, "float"),
            FlagKind::Boolean => write!(f, "boolean"),
        }
    }
}

fn parse_bool(literal: &str) -> Option<bool> {
    match literal.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A typed flag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> FlagKind {
        match self {
            Value::Bool(_) => FlagKind::Boolean,
            Value::Int(_) => FlagKind::Integer,
            Value::Float(_) => FlagKind::Float,
            Value::Str(_) => FlagKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A flag definition.
///
/// # Example
///
/// ```
/// use helmsman_dispatch::Flag;
///
/// let port = Flag::integer("port")
///     .short('p')
///     .env("MYAPP_PORT")
///     .default("8080")
///     .help("Port to listen on");
/// assert_eq!(port.destination(), "port");
/// ```
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    short: Option<char>,
    kind: FlagKind,
    default: Option<String>,
    env_var: Option<String>,
    required: bool,
    positional: bool,
    destination: Option<String>,
    help: Option<String>,
}

impl Flag {
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            short: None,
            kind,
            default: None,
            env_var: None,
            required: false,
            positional: false,
            destination: None,
            help: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Boolean)
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Default literal, parsed with the flag's kind when the tree is built.
    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Environment variable consulted when the flag is absent from the
    /// command line.
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env_var = Some(var.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow the flag to be satisfied by a leftover positional token.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// Store the value under `destination` instead of the flag name.
    pub fn dest(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_boolean(&self) -> bool {
        self.kind == FlagKind::Boolean
    }

    pub fn destination(&self) -> &str {
        self.destination.as_deref().unwrap_or(&self.name)
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Cli,
    Env,
    Config,
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Cli => write!(f, "command line"),
            ValueSource::Env => write!(f, "environment"),
            ValueSource::Config => write!(f, "configuration"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A value together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub value: Value,
    pub source: ValueSource,
}

/// Resolved flag values, keyed by destination.
///
/// Flags that received no value from any source are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagValues {
    values: BTreeMap<String, ResolvedValue>,
}

impl FlagValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, destination: &str, value: Value, source: ValueSource) {
        self.values
            .insert(destination.to_string(), ResolvedValue { value, source });
    }

    pub fn get(&self, destination: &str) -> Option<&Value> {
        self.values.get(destination).map(|r| &r.value)
    }

    pub fn resolved(&self, destination: &str) -> Option<&ResolvedValue> {
        self.values.get(destination)
    }

    pub fn source(&self, destination: &str) -> Option<ValueSource> {
        self.values.get(destination).map(|r| r.source)
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.values.contains_key(destination)
    }

    pub fn string(&self, destination: &str) -> Option<&str> {
        self.get(destination).and_then(Value::as_str)
    }

    pub fn integer(&self, destination: &str) -> Option<i64> {
        self.get(destination).and_then(Value::as_int)
    }

    pub fn float(&self, destination: &str) -> Option<f64> {
        self.get(destination).and_then(Value::as_float)
    }

    /// A boolean flag's value; absent reads as `false`.
    pub fn boolean(&self, destination: &str) -> bool {
        self.get(destination)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
