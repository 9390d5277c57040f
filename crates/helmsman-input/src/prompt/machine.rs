//! The prompt state machine.
//!
//! A [`PromptMachine`] holds everything about one prompt in flight: the text
//! typed so far, the highlighted row, the toggled set, the last validation
//! message. It never reads or writes a terminal. The driver (see
//! [`Prompter`](crate::Prompter)) asks it for a [`Frame`] while it is
//! `Rendering` and feeds it [`Event`]s while it is `AwaitingInput`:
//!
//! ```text
//! Idle ─start─▶ Rendering ─render─▶ AwaitingInput ─edit/move─▶ Rendering
//!                                        │
//!                                      Enter
//!                                        ▼
//!                                   Validating ─reject─▶ Rendering
//!                                        │
//!                                      accept ─▶ Accepted
//!
//! AwaitingInput ─Escape/Ctrl-C/EOF/read failure─▶ Cancelled
//! ```

use std::panic::{self, AssertUnwindSafe};

use tracing::trace;

use super::completion::complete;
use super::spec::{Answer, PromptKind, PromptSpec};
use crate::error::{CancelReason, InputError};
use crate::style::{StyleToken, Styler};
use crate::terminal::{Frame, Key};

const REQUIRED_MSG: &str = "A value is required.";
const YES_NO_MSG: &str = "Please answer y or n.";
const SELECTION_MSG: &str = "Select at least one item.";
const VALIDATOR_FAILED_MSG: &str = "Invalid value.";

/// Where a prompt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Idle,
    Rendering,
    AwaitingInput,
    Validating,
    Accepted,
    Cancelled(CancelReason),
}

impl PromptState {
    /// Whether the prompt has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PromptState::Accepted | PromptState::Cancelled(_))
    }
}

/// An input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key was read.
    Key(Key),
    /// Reading from the input stream failed.
    Closed,
}

impl From<Key> for Event {
    fn from(key: Key) -> Self {
        Event::Key(key)
    }
}

/// One prompt in flight.
#[derive(Debug)]
pub struct PromptMachine {
    spec: PromptSpec,
    state: PromptState,
    buffer: String,
    cursor: usize,
    toggled: Vec<usize>,
    message: Option<String>,
    candidates: Vec<String>,
    answer: Option<Answer>,
    rejections: usize,
}

impl PromptMachine {
    /// Create a machine in the `Idle` state.
    ///
    /// Fails when a list prompt has no items or when the default cannot be
    /// honored.
    pub fn new(spec: PromptSpec) -> Result<Self, InputError> {
        let mut cursor = 0;
        match spec.kind {
            PromptKind::Select | PromptKind::MultiSelect => {
                if spec.items.is_empty() {
                    return Err(InputError::NoItems(spec.label.clone()));
                }
                if let Some(default) = &spec.default {
                    cursor = spec
                        .items
                        .iter()
                        .position(|item| item == default)
                        .ok_or_else(|| InputError::UnknownDefault {
                            label: spec.label.clone(),
                            default: default.clone(),
                        })?;
                }
            }
            PromptKind::Confirm => {
                if let Some(default) = &spec.default {
                    if parse_yes_no(default).is_none() {
                        return Err(InputError::UnknownDefault {
                            label: spec.label.clone(),
                            default: default.clone(),
                        });
                    }
                }
            }
            PromptKind::Text => {}
        }

        Ok(Self {
            spec,
            state: PromptState::Idle,
            buffer: String::new(),
            cursor,
            toggled: Vec::new(),
            message: None,
            candidates: Vec::new(),
            answer: None,
            rejections: 0,
        })
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn spec(&self) -> &PromptSpec {
        &self.spec
    }

    /// The text typed so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Index of the highlighted item.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Toggled item indices in insertion order.
    pub fn toggled(&self) -> &[usize] {
        &self.toggled
    }

    /// The message shown with the next frame, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Completion candidates shown with the next frame.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// How many submissions have been rejected so far.
    pub fn rejections(&self) -> usize {
        self.rejections
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    pub fn into_answer(self) -> Option<Answer> {
        self.answer
    }

    /// `Idle → Rendering`.
    pub fn start(&mut self) {
        if self.state == PromptState::Idle {
            self.transition(PromptState::Rendering);
        }
    }

    /// Produce the frame to draw. `Rendering → AwaitingInput`.
    pub fn render(&mut self, styler: &dyn Styler) -> Frame {
        let frame = self.frame(styler);
        if self.state == PromptState::Rendering {
            self.transition(PromptState::AwaitingInput);
        }
        frame
    }

    /// Feed one event. Ignored unless the machine is `AwaitingInput`.
    pub fn handle(&mut self, event: Event) -> PromptState {
        if self.state != PromptState::AwaitingInput {
            return self.state;
        }

        let key = match event {
            Event::Closed => {
                self.transition(PromptState::Cancelled(CancelReason::ReadFailed));
                return self.state;
            }
            Event::Key(key) => key,
        };

        match key {
            Key::Escape => self.transition(PromptState::Cancelled(CancelReason::User)),
            Key::Interrupt => self.transition(PromptState::Cancelled(CancelReason::Interrupted)),
            Key::Eof => self.transition(PromptState::Cancelled(CancelReason::EndOfInput)),
            Key::Enter => self.submit(),
            other => match self.spec.kind {
                PromptKind::Text | PromptKind::Confirm => self.edit(other),
                PromptKind::Select | PromptKind::MultiSelect => self.navigate(other),
            },
        }
        self.state
    }

    /// The frame for the current state, without transitioning.
    pub fn frame(&self, styler: &dyn Styler) -> Frame {
        let mut frame = Frame::new();
        let label = styler.paint(&self.spec.label, StyleToken::Label);

        match self.spec.kind {
            PromptKind::Text => {
                let hint = self
                    .spec
                    .default
                    .as_ref()
                    .map(|d| format!(" {}", styler.paint(&format!("[{d}]"), StyleToken::Hint)))
                    .unwrap_or_default();
                frame.push(format!(
                    "{label}{hint}: {}",
                    styler.paint(&self.buffer, StyleToken::Input)
                ));
                if !self.candidates.is_empty() {
                    frame.push(format!(
                        "  {}",
                        styler.paint(&self.candidates.join("  "), StyleToken::Muted)
                    ));
                }
            }
            PromptKind::Confirm => {
                let suffix = match self.spec.default.as_deref().and_then(parse_yes_no) {
                    None => "[y/n]",
                    Some(true) => "[Y/n]",
                    Some(false) => "[y/N]",
                };
                frame.push(format!(
                    "{label} {}: {}",
                    styler.paint(suffix, StyleToken::Hint),
                    styler.paint(&self.buffer, StyleToken::Input)
                ));
            }
            PromptKind::Select => {
                frame.push(label);
                for (i, item) in self.spec.items.iter().enumerate() {
                    if i == self.cursor {
                        frame.push(styler.paint(&format!("> {item}"), StyleToken::Highlight));
                    } else {
                        frame.push(format!("  {item}"));
                    }
                }
            }
            PromptKind::MultiSelect => {
                frame.push(format!(
                    "{label} {}",
                    styler.paint("[space: toggle, enter: confirm]", StyleToken::Hint)
                ));
                for (i, item) in self.spec.items.iter().enumerate() {
                    let checkbox = if self.toggled.contains(&i) {
                        styler.paint("[x]", StyleToken::Selected)
                    } else {
                        "[ ]".to_string()
                    };
                    if i == self.cursor {
                        frame.push(format!(
                            "{} {checkbox} {}",
                            styler.paint(">", StyleToken::Highlight),
                            styler.paint(item, StyleToken::Highlight)
                        ));
                    } else {
                        frame.push(format!("  {checkbox} {item}"));
                    }
                }
            }
        }

        if let Some(message) = &self.message {
            frame.push(styler.paint(&format!("! {message}"), StyleToken::Error));
        }
        frame
    }

    /// The one-line summary that replaces the prompt once accepted.
    pub fn summary(&self, styler: &dyn Styler) -> Option<String> {
        self.answer.as_ref().map(|answer| {
            format!(
                "{}: {}",
                styler.paint(&self.spec.label, StyleToken::Label),
                styler.paint(&answer.summary(), StyleToken::Muted)
            )
        })
    }

    fn transition(&mut self, next: PromptState) {
        trace!(label = %self.spec.label, from = ?self.state, to = ?next, "prompt transition");
        self.state = next;
    }

    fn edit(&mut self, key: Key) {
        match key {
            Key::Char(c) => {
                self.buffer.push(c);
                self.candidates.clear();
                self.transition(PromptState::Rendering);
            }
            Key::Backspace => {
                if self.buffer.pop().is_some() {
                    self.candidates.clear();
                    self.transition(PromptState::Rendering);
                }
            }
            Key::Tab if self.spec.kind == PromptKind::Text => {
                if let Some(source) = self.spec.completion.clone() {
                    let completion = complete(&self.buffer, &source(&self.buffer));
                    self.buffer = completion.buffer;
                    self.candidates = completion.candidates;
                    self.transition(PromptState::Rendering);
                }
            }
            _ => {}
        }
    }

    fn navigate(&mut self, key: Key) {
        let len = self.spec.items.len();
        match key {
            Key::Up => {
                self.cursor = (self.cursor + len - 1) % len;
                self.transition(PromptState::Rendering);
            }
            Key::Down => {
                self.cursor = (self.cursor + 1) % len;
                self.transition(PromptState::Rendering);
            }
            Key::Char(' ') if self.spec.kind == PromptKind::MultiSelect => {
                self.toggle(self.cursor);
                self.transition(PromptState::Rendering);
            }
            _ => {}
        }
    }

    fn toggle(&mut self, index: usize) {
        if let Some(pos) = self.toggled.iter().position(|&i| i == index) {
            self.toggled.remove(pos);
        } else {
            self.toggled.push(index);
        }
    }

    fn submit(&mut self) {
        self.transition(PromptState::Validating);
        match self.evaluate() {
            Ok(answer) => {
                self.answer = Some(answer);
                self.message = None;
                self.transition(PromptState::Accepted);
            }
            Err(reason) => {
                self.rejections += 1;
                self.message = Some(reason);
                self.buffer.clear();
                self.candidates.clear();
                self.transition(PromptState::Rendering);
            }
        }
    }

    fn evaluate(&self) -> Result<Answer, String> {
        match self.spec.kind {
            PromptKind::Text => {
                let value = if self.spec.trim {
                    self.buffer.trim()
                } else {
                    self.buffer.as_str()
                };
                if value.is_empty() {
                    return match (&self.spec.default, self.spec.allow_empty) {
                        (Some(default), _) => Ok(Answer::Text(default.clone())),
                        (None, true) => Ok(Answer::Text(String::new())),
                        (None, false) => Err(REQUIRED_MSG.to_string()),
                    };
                }
                if let Some(validator) = &self.spec.validator {
                    run_validator(validator.as_ref(), value)?;
                }
                Ok(Answer::Text(value.to_string()))
            }
            PromptKind::Confirm => {
                let input = self.buffer.trim();
                let literal = if input.is_empty() {
                    self.spec.default.as_deref().unwrap_or_default()
                } else {
                    input
                };
                parse_yes_no(literal)
                    .map(Answer::Confirm)
                    .ok_or_else(|| YES_NO_MSG.to_string())
            }
            PromptKind::Select => Ok(Answer::Selected {
                index: self.cursor,
                value: self.spec.items[self.cursor].clone(),
            }),
            PromptKind::MultiSelect => {
                if self.toggled.is_empty() && self.spec.require_selection {
                    return Err(SELECTION_MSG.to_string());
                }
                Ok(Answer::MultiSelected(
                    self.toggled
                        .iter()
                        .map(|&i| (i, self.spec.items[i].clone()))
                        .collect(),
                ))
            }
        }
    }
}

/// A validator that panics counts as a rejection with a generic reason.
fn run_validator(validator: &dyn Fn(&str) -> Result<(), String>, value: &str) -> Result<(), String> {
    panic::catch_unwind(AssertUnwindSafe(|| validator(value)))
        .unwrap_or_else(|_| Err(VALIDATOR_FAILED_MSG.to_string()))
}

fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
