//! Interactive prompts.
//!
//! - [`spec`]: what to ask ([`PromptSpec`]) and what came back ([`Answer`])
//! - [`machine`]: the terminal-free state machine behind every prompt
//! - [`prompter`]: drives a machine against a [`Terminal`](crate::Terminal)
//! - [`completion`]: tab completion as a pure function

pub mod completion;
pub mod machine;
pub mod prompter;
pub mod spec;

pub use completion::{complete, Completion};
pub use machine::{Event, PromptMachine, PromptState};
pub use prompter::{Interactive, Prompter};
pub use spec::{Answer, CompletionFn, PromptKind, PromptSpec, ValidatorFn};
