//! Binding positional tokens to declared arguments.

use helmsman_input::{Answer, Interactive, PromptSpec};
use serde::Serialize;
use tracing::debug;

use crate::error::{DispatchError, UsageError};

/// A positional argument declaration.
///
/// Arguments bind in declaration order. A required argument may not follow
/// an optional one; the tree refuses to build otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    name: String,
    prompt: Option<String>,
    required: bool,
    help: Option<String>,
}

impl Arg {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            required: true,
            help: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    /// Label used when the argument is prompted for. Defaults to the name.
    pub fn prompt(mut self, label: impl Into<String>) -> Self {
        self.prompt = Some(label.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn prompt_label(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.name)
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// How an argument got its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgSource {
    Token,
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundArg {
    pub name: String,
    pub value: String,
    pub source: ArgSource,
}

/// Bound argument values in declaration order. Unset optionals are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BoundArgs {
    values: Vec<BoundArg>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).map(|a| a.value.as_str())
    }

    pub fn source(&self, name: &str) -> Option<ArgSource> {
        self.find(name).map(|a| a.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundArg> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn find(&self, name: &str) -> Option<&BoundArg> {
        self.values.iter().find(|a| a.name == name)
    }

    fn push(&mut self, name: &str, value: String, source: ArgSource) {
        self.values.push(BoundArg {
            name: name.to_string(),
            value,
            source,
        });
    }
}

/// Bind `tokens` to `decls`, one token per argument.
///
/// Extra tokens are rejected before anything is prompted for. A missing
/// required argument is asked for through `prompter` when it is interactive,
/// otherwise it is a usage error.
pub fn bind(
    command: &str,
    decls: &[Arg],
    tokens: Vec<String>,
    mut prompter: Option<&mut (dyn Interactive + '_)>,
) -> Result<BoundArgs, DispatchError> {
    if tokens.len() > decls.len() {
        return Err(UsageError::TooManyArguments {
            command: command.to_string(),
            extra: tokens[decls.len()..].to_vec(),
        }
        .into());
    }

    let mut bound = BoundArgs::default();
    let mut tokens = tokens.into_iter();

    for decl in decls {
        if let Some(token) = tokens.next() {
            bound.push(decl.name(), token, ArgSource::Token);
            continue;
        }
        if !decl.is_required() {
            continue;
        }

        let prompter = match prompter.as_deref_mut() {
            Some(p) if p.is_interactive() => p,
            _ => return Err(UsageError::MissingArgument(decl.name().to_string()).into()),
        };

        debug!(argument = decl.name(), "prompting for missing argument");
        match prompter.prompt(PromptSpec::text(decl.prompt_label()))? {
            Answer::Text(value) => bound.push(decl.name(), value, ArgSource::Prompt),
            _ => {
                return Err(DispatchError::Prompt(
                    helmsman_input::InputError::UnexpectedAnswer(decl.prompt_label().to_string()),
                ))
            }
        }
    }

    Ok(bound)
}
