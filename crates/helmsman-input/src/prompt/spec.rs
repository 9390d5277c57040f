//! Prompt specifications.

use std::fmt;
use std::rc::Rc;

/// Validator function type.
///
/// Returns `Err(reason)` to reject a submission; the reason is shown to the
/// user before re-prompting.
pub type ValidatorFn = Rc<dyn Fn(&str) -> Result<(), String>>;

/// Completion source type: partial input in, candidate completions out.
pub type CompletionFn = Rc<dyn Fn(&str) -> Vec<String>>;

/// The prompt archetypes the prompter supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Text,
    Confirm,
    Select,
    MultiSelect,
}

/// Everything the prompter needs to run one prompt.
///
/// Built fresh for every prompt call and consumed by it.
///
/// # Example
///
/// ```
/// use helmsman_input::PromptSpec;
///
/// let email = PromptSpec::text("Email")
///     .validate_with(|s| {
///         if s.contains('@') { Ok(()) } else { Err("must contain @".into()) }
///     });
///
/// let env = PromptSpec::select("Environment", ["dev", "staging", "prod"])
///     .default("staging");
/// ```
#[derive(Clone)]
pub struct PromptSpec {
    pub(crate) kind: PromptKind,
    pub(crate) label: String,
    pub(crate) default: Option<String>,
    pub(crate) validator: Option<ValidatorFn>,
    pub(crate) items: Vec<String>,
    pub(crate) completion: Option<CompletionFn>,
    pub(crate) allow_empty: bool,
    pub(crate) require_selection: bool,
    pub(crate) trim: bool,
}

impl PromptSpec {
    fn new(kind: PromptKind, label: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            default: None,
            validator: None,
            items,
            completion: None,
            allow_empty: false,
            require_selection: false,
            trim: true,
        }
    }

    /// Free text entry.
    pub fn text(label: impl Into<String>) -> Self {
        Self::new(PromptKind::Text, label, Vec::new())
    }

    /// A yes/no question.
    pub fn confirm(label: impl Into<String>) -> Self {
        Self::new(PromptKind::Confirm, label, Vec::new())
    }

    /// Pick exactly one of `items`.
    pub fn select<I, S>(label: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            PromptKind::Select,
            label,
            items.into_iter().map(Into::into).collect(),
        )
    }

    /// Pick any subset of `items`.
    pub fn multi_select<I, S>(label: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            PromptKind::MultiSelect,
            label,
            items.into_iter().map(Into::into).collect(),
        )
    }

    /// Set the default.
    ///
    /// For text prompts this is the value used when the user submits nothing.
    /// For select prompts it names the initially highlighted item. For confirm
    /// prompts use [`default_answer`](Self::default_answer).
    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the answer a confirm prompt gives when the user submits nothing.
    pub fn default_answer(mut self, yes: bool) -> Self {
        self.default = Some(if yes { "y" } else { "n" }.to_string());
        self
    }

    /// Add a validator that rejects with a fixed message.
    pub fn validate<F>(self, f: F, error_msg: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        let msg = error_msg.into();
        self.validate_with(move |value| if f(value) { Ok(()) } else { Err(msg.clone()) })
    }

    /// Add a validator that explains each rejection.
    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + 'static,
    {
        self.validator = Some(Rc::new(f));
        self
    }

    /// Enable tab completion from `source`.
    pub fn completion<F>(mut self, source: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + 'static,
    {
        self.completion = Some(Rc::new(source));
        self
    }

    /// Accept an empty submission as a final value when there is no default.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Refuse to accept a multi-select with nothing toggled.
    pub fn require_selection(mut self) -> Self {
        self.require_selection = true;
        self
    }

    /// Control whether surrounding whitespace is trimmed from text input.
    ///
    /// Default is `true`.
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn allows_multiple(&self) -> bool {
        self.kind == PromptKind::MultiSelect
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }
}

impl fmt::Debug for PromptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSpec")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("default", &self.default)
            .field("items", &self.items)
            .field("has_validator", &self.validator.is_some())
            .field("has_completion", &self.completion.is_some())
            .field("allow_empty", &self.allow_empty)
            .field("require_selection", &self.require_selection)
            .finish()
    }
}

/// What an accepted prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Selected { index: usize, value: String },
    /// Toggled items in the order they were first toggled on.
    MultiSelected(Vec<(usize, String)>),
}

impl Answer {
    pub fn into_text(self) -> Option<String> {
        match self {
            Answer::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Answer::Confirm(b) => Some(*b),
            _ => None,
        }
    }

    /// Short human-readable rendering used for the accepted summary line.
    pub fn summary(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Confirm(true) => "yes".to_string(),
            Answer::Confirm(false) => "no".to_string(),
            Answer::Selected { value, .. } => value.clone(),
            Answer::MultiSelected(items) => items
                .iter()
                .map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
