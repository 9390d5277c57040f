//! Error types for interactive input.

use std::fmt;
use std::io;

/// Why a prompt ended without a value.
///
/// Callers can treat every reason the same way; the distinction exists for
/// diagnostics and for choosing between a silent exit and an error exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The user pressed Escape.
    User,
    /// Ctrl-C, or the invocation's cancellation token was tripped.
    Interrupted,
    /// The input stream reported end of input (Ctrl-D, closed pipe).
    EndOfInput,
    /// Reading from the input stream failed.
    ReadFailed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "cancelled by user"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::EndOfInput => write!(f, "end of input"),
            Self::ReadFailed => write!(f, "input stream failed"),
        }
    }
}

/// Errors that can occur while prompting.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The prompt was cancelled before a value was accepted.
    #[error("Prompt cancelled ({0}).")]
    Cancelled(CancelReason),

    /// A select or multi-select prompt was given nothing to choose from.
    #[error("Prompt '{0}' has no items to choose from.")]
    NoItems(String),

    /// The prompt's default does not name one of its items.
    #[error("Default '{default}' is not one of the items of prompt '{label}'.")]
    UnknownDefault { label: String, default: String },

    /// No interactive terminal is attached.
    #[error("Cannot prompt for '{0}': no interactive terminal.")]
    NotInteractive(String),

    /// The prompter returned a different kind of answer than was asked for.
    #[error("Prompt '{0}' produced an unexpected answer.")]
    UnexpectedAnswer(String),

    /// Drawing to the terminal failed.
    #[error("Failed to draw prompt: {0}")]
    Render(#[source] io::Error),
}

impl InputError {
    /// Returns true for any cancellation, whatever its reason.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// The cancellation reason, if this is a cancellation.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }
}
