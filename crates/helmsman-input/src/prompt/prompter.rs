//! Driving prompts against a terminal.

use tracing::{debug, trace};

use super::machine::{Event, PromptMachine, PromptState};
use super::spec::{Answer, PromptSpec};
use crate::cancel::CancelToken;
use crate::error::{CancelReason, InputError};
use crate::style::{PlainStyler, Styler};
use crate::terminal::Terminal;

/// Something that can ask the user a question.
///
/// This is the seam handlers and the argument binder see. It is object safe so
/// it can be passed around as `&mut dyn Interactive`. The typed helpers are
/// thin wrappers over [`prompt`](Self::prompt).
pub trait Interactive {
    /// Whether prompting can reach a human.
    fn is_interactive(&self) -> bool;

    /// Run one prompt to completion.
    fn prompt(&mut self, spec: PromptSpec) -> Result<Answer, InputError>;

    /// Ask for free text.
    fn text(&mut self, label: &str) -> Result<String, InputError> {
        match self.prompt(PromptSpec::text(label))? {
            Answer::Text(value) => Ok(value),
            _ => Err(InputError::UnexpectedAnswer(label.to_string())),
        }
    }

    /// Ask a yes/no question.
    fn confirm(&mut self, label: &str, default: Option<bool>) -> Result<bool, InputError> {
        let mut spec = PromptSpec::confirm(label);
        if let Some(yes) = default {
            spec = spec.default_answer(yes);
        }
        match self.prompt(spec)? {
            Answer::Confirm(yes) => Ok(yes),
            _ => Err(InputError::UnexpectedAnswer(label.to_string())),
        }
    }

    /// Pick one item. Returns its index and value.
    fn select(&mut self, label: &str, items: &[&str]) -> Result<(usize, String), InputError> {
        match self.prompt(PromptSpec::select(label, items.iter().copied()))? {
            Answer::Selected { index, value } => Ok((index, value)),
            _ => Err(InputError::UnexpectedAnswer(label.to_string())),
        }
    }

    /// Pick any number of items, in the order they were toggled on.
    fn multi_select(
        &mut self,
        label: &str,
        items: &[&str],
    ) -> Result<Vec<(usize, String)>, InputError> {
        match self.prompt(PromptSpec::multi_select(label, items.iter().copied()))? {
            Answer::MultiSelected(picked) => Ok(picked),
            _ => Err(InputError::UnexpectedAnswer(label.to_string())),
        }
    }
}

impl<I: Interactive + ?Sized> Interactive for &mut I {
    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }

    fn prompt(&mut self, spec: PromptSpec) -> Result<Answer, InputError> {
        (**self).prompt(spec)
    }
}

impl<I: Interactive + ?Sized> Interactive for Box<I> {
    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }

    fn prompt(&mut self, spec: PromptSpec) -> Result<Answer, InputError> {
        (**self).prompt(spec)
    }
}

/// Runs [`PromptMachine`]s against a [`Terminal`].
///
/// One prompt is active at a time; `prompt` takes `&mut self`.
///
/// # Example
///
/// ```
/// use helmsman_input::{Interactive, MockTerminal, Prompter};
///
/// let mut prompter = Prompter::new(MockTerminal::with_lines(["", "Alice"]));
/// assert_eq!(prompter.text("Name").unwrap(), "Alice");
/// ```
pub struct Prompter<T: Terminal> {
    terminal: T,
    styler: Box<dyn Styler>,
    cancel: CancelToken,
}

impl<T: Terminal> Prompter<T> {
    /// A prompter with plain styling and its own cancel token.
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            styler: Box::new(PlainStyler),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_styler(mut self, styler: impl Styler + 'static) -> Self {
        self.styler = Box::new(styler);
        self
    }

    /// Share a cancel token. A cancelled token aborts the next key read.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    fn drive(&mut self, spec: PromptSpec) -> Result<Answer, InputError> {
        if !self.terminal.is_interactive() {
            return Err(InputError::NotInteractive(spec.label().to_string()));
        }

        let mut machine = PromptMachine::new(spec)?;
        machine.start();

        loop {
            match machine.state() {
                PromptState::Idle => machine.start(),
                PromptState::Rendering => {
                    let frame = machine.render(self.styler.as_ref());
                    self.terminal.draw(&frame).map_err(InputError::Render)?;
                }
                PromptState::AwaitingInput | PromptState::Validating => {
                    if self.cancel.is_cancelled() {
                        debug!(label = %machine.spec().label(), "prompt cancelled by token");
                        return Err(InputError::Cancelled(CancelReason::Interrupted));
                    }
                    let event = match self.terminal.read_key() {
                        Ok(key) => Event::Key(key),
                        Err(err) => {
                            debug!(error = %err, "terminal read failed");
                            Event::Closed
                        }
                    };
                    machine.handle(event);
                }
                PromptState::Accepted => {
                    if let Some(summary) = machine.summary(self.styler.as_ref()) {
                        self.terminal.finish(&summary).map_err(InputError::Render)?;
                    }
                    trace!(
                        label = %machine.spec().label(),
                        rejections = machine.rejections(),
                        "prompt accepted"
                    );
                    let label = machine.spec().label().to_string();
                    return machine
                        .into_answer()
                        .ok_or(InputError::UnexpectedAnswer(label));
                }
                PromptState::Cancelled(reason) => {
                    debug!(label = %machine.spec().label(), %reason, "prompt cancelled");
                    return Err(InputError::Cancelled(reason));
                }
            }
        }
    }
}

impl<T: Terminal> Interactive for Prompter<T> {
    fn is_interactive(&self) -> bool {
        self.terminal.is_interactive()
    }

    fn prompt(&mut self, spec: PromptSpec) -> Result<Answer, InputError> {
        self.drive(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{Key, MockTerminal};

    fn prompter(term: MockTerminal) -> Prompter<MockTerminal> {
        Prompter::new(term)
    }

    #[test]
    fn text_reprompts_on_empty_then_accepts() {
        let mut p = prompter(MockTerminal::with_lines(["", "Alice"]));
        assert_eq!(p.text("Name").unwrap(), "Alice");

        let term = p.into_terminal();
        assert!(term.frames().iter().any(|f| f.contains("A value is required.")));
        assert_eq!(term.summaries(), ["Name: Alice".to_string()]);
    }

    #[test]
    fn validator_rejection_then_acceptance() {
        let mut p = prompter(MockTerminal::with_lines(["bob", "bob@example.com"]));
        let spec = PromptSpec::text("Email").validate(|s| s.contains('@'), "must contain @");
        let answer = p.prompt(spec).unwrap();
        assert_eq!(answer, Answer::Text("bob@example.com".into()));
        assert!(p.terminal().frames().iter().any(|f| f.contains("must contain @")));
    }

    #[test]
    fn non_interactive_terminal_is_refused() {
        let mut p = prompter(MockTerminal::non_terminal());
        let err = p.text("Name").unwrap_err();
        assert!(matches!(err, InputError::NotInteractive(label) if label == "Name"));
    }

    #[test]
    fn exhausted_script_is_end_of_input() {
        let mut p = prompter(MockTerminal::with_keys([Key::Char('a')]));
        let err = p.text("Name").unwrap_err();
        assert_eq!(err.cancel_reason(), Some(CancelReason::EndOfInput));
    }

    #[test]
    fn read_failure_is_reported_as_cancellation() {
        let mut p = prompter(MockTerminal::new().then_fail());
        let err = p.confirm("Go?", None).unwrap_err();
        assert_eq!(err.cancel_reason(), Some(CancelReason::ReadFailed));
    }

    #[test]
    fn escape_and_ctrl_c() {
        let mut p = prompter(MockTerminal::with_keys([Key::Escape]));
        assert_eq!(
            p.select("Pick", &["a", "b"]).unwrap_err().cancel_reason(),
            Some(CancelReason::User)
        );

        let mut p = prompter(MockTerminal::with_keys([Key::Interrupt]));
        assert_eq!(
            p.text("Name").unwrap_err().cancel_reason(),
            Some(CancelReason::Interrupted)
        );
    }

    #[test]
    fn cancelled_token_stops_before_reading() {
        let token = CancelToken::new();
        token.cancel();
        let mut p = prompter(MockTerminal::with_lines(["Alice"])).with_cancel_token(token);
        let err = p.text("Name").unwrap_err();
        assert_eq!(err.cancel_reason(), Some(CancelReason::Interrupted));
        assert_eq!(p.terminal().remaining(), 6);
    }

    #[test]
    fn typed_helpers() {
        let term = MockTerminal::new()
            .then_line("yes")
            .then_keys([Key::Down, Key::Enter])
            .then_keys([Key::Char(' '), Key::Down, Key::Char(' '), Key::Enter]);
        let mut p = prompter(term);

        assert!(p.confirm("Deploy?", Some(false)).unwrap());
        assert_eq!(
            p.select("Env", &["dev", "prod"]).unwrap(),
            (1, "prod".to_string())
        );
        assert_eq!(
            p.multi_select("Features", &["a", "b"]).unwrap(),
            vec![(0, "a".to_string()), (1, "b".to_string())]
        );
    }

    #[test]
    fn select_with_no_items_fails_before_drawing() {
        let mut p = prompter(MockTerminal::new());
        let err = p.select("Pick", &[]).unwrap_err();
        assert!(matches!(err, InputError::NoItems(_)));
        assert!(p.terminal().frames().is_empty());
    }

    #[test]
    fn works_through_trait_object() {
        let mut p = prompter(MockTerminal::with_lines(["n"]));
        let dynamic: &mut dyn Interactive = &mut p;
        assert!(dynamic.is_interactive());
        assert!(!dynamic.confirm("Proceed?", Some(true)).unwrap());
    }
}
