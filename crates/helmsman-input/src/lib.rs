//! Interactive input for CLI applications.
//!
//! `helmsman-input` asks the user questions: free text, yes/no, pick one,
//! pick many. Every prompt is a small state machine ([`PromptMachine`]) that
//! never touches the terminal itself, so the same prompt logic runs against a
//! real console or a scripted [`MockTerminal`].
//!
//! # Quick Start
//!
//! ```
//! use helmsman_input::{Interactive, MockTerminal, PromptSpec, Prompter};
//!
//! let mut prompter = Prompter::new(MockTerminal::with_lines(["bob", "bob@example.com"]));
//!
//! let email = prompter
//!     .prompt(PromptSpec::text("Email").validate(|s| s.contains('@'), "must contain @"))
//!     .unwrap()
//!     .into_text();
//! assert_eq!(email.as_deref(), Some("bob@example.com"));
//! ```
//!
//! # Architecture
//!
//! ```text
//! Prompter<T: Terminal>
//! ├── PromptMachine   state, buffer, cursor, toggles, messages
//! ├── Styler          paints frames (PlainStyler, ConsoleStyler)
//! ├── Terminal        reads keys, draws frames (ConsoleTerminal, MockTerminal)
//! └── CancelToken     checked before every read
//! ```
//!
//! Handlers and the argument binder only see the object-safe [`Interactive`]
//! trait.
//!
//! # Testing
//!
//! [`MockTerminal`] replays scripted keys and records every frame, and
//! [`MockEnv`] stands in for the process environment.

mod cancel;
pub mod env;
mod error;
pub mod prompt;
mod style;
mod terminal;

pub use cancel::CancelToken;
pub use env::{EnvReader, MockEnv, RealEnv};
pub use error::{CancelReason, InputError};
pub use prompt::{
    complete, Answer, Completion, Event, Interactive, PromptKind, PromptMachine, PromptSpec,
    PromptState, Prompter,
};
pub use style::{ConsoleStyler, PlainStyler, StyleToken, Styler};
pub use terminal::{ConsoleTerminal, Frame, Key, MockTerminal, Terminal};
