//! Environment abstractions for testability.
//!
//! Flag resolution reads environment variables through [`EnvReader`] so tests
//! can supply a [`MockEnv`] instead of mutating the process environment.

use std::collections::HashMap;

/// Abstraction over environment variables.
///
/// Absence is a normal answer, never an error.
pub trait EnvReader {
    /// Get an environment variable value.
    fn var(&self, name: &str) -> Option<String>;
}

impl<R: EnvReader + ?Sized> EnvReader for &R {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

impl<R: EnvReader + ?Sized> EnvReader for Box<R> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Real environment variable reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Mock environment variable reader for testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    /// Create an empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
