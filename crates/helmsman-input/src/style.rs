//! Presentation hooks for prompt frames.
//!
//! A [`Styler`] decorates text for a named role. It only changes what the user
//! sees; prompt state never depends on it.

use console::Style;

/// The role a piece of prompt text plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleToken {
    /// The prompt label.
    Label,
    /// An inline default or answer hint such as `[y/n]`.
    Hint,
    /// What the user has typed so far.
    Input,
    /// The highlighted row of a list.
    Highlight,
    /// The checkbox of a toggled multi-select row.
    Selected,
    /// Validation or usage messages.
    Error,
    /// Completion candidates and the accepted answer.
    Muted,
}

/// Decorates prompt text.
pub trait Styler {
    /// Return `text` decorated for `token`.
    fn paint(&self, text: &str, token: StyleToken) -> String;
}

/// Leaves text untouched. Used for tests and non-color terminals.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn paint(&self, text: &str, _token: StyleToken) -> String {
        text.to_string()
    }
}

/// ANSI styling through the `console` crate.
///
/// `console` drops the escape codes on its own when colors are unsupported.
#[derive(Debug, Clone)]
pub struct ConsoleStyler {
    label: Style,
    hint: Style,
    input: Style,
    highlight: Style,
    selected: Style,
    error: Style,
    muted: Style,
}

impl Default for ConsoleStyler {
    fn default() -> Self {
        Self {
            label: Style::new().bold(),
            hint: Style::new().dim(),
            input: Style::new(),
            highlight: Style::new().cyan().bold(),
            selected: Style::new().green(),
            error: Style::new().red(),
            muted: Style::new().dim(),
        }
    }
}

impl ConsoleStyler {
    /// Override the style used for one token.
    pub fn with(mut self, token: StyleToken, style: Style) -> Self {
        *self.slot(token) = style;
        self
    }

    fn slot(&mut self, token: StyleToken) -> &mut Style {
        match token {
            StyleToken::Label => &mut self.label,
            StyleToken::Hint => &mut self.hint,
            StyleToken::Input => &mut self.input,
            StyleToken::Highlight => &mut self.highlight,
            StyleToken::Selected => &mut self.selected,
            StyleToken::Error => &mut self.error,
            StyleToken::Muted => &mut self.muted,
        }
    }

    fn style(&self, token: StyleToken) -> &Style {
        match token {
            StyleToken::Label => &self.label,
            StyleToken::Hint => &self.hint,
            StyleToken::Input => &self.input,
            StyleToken::Highlight => &self.highlight,
            StyleToken::Selected => &self.selected,
            StyleToken::Error => &self.error,
            StyleToken::Muted => &self.muted,
        }
    }
}

impl Styler for ConsoleStyler {
    fn paint(&self, text: &str, token: StyleToken) -> String {
        self.style(token).apply_to(text).to_string()
    }
}
