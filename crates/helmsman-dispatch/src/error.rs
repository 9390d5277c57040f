//! Error types for building and dispatching command trees.

use std::io;

use helmsman_input::{CancelReason, InputError};
use thiserror::Error;

use crate::flags::FlagKind;
use crate::hooks::HookError;
use crate::render::RenderError;

/// A malformed command tree, reported by [`CommandTree::build`](crate::CommandTree::build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Invalid command name '{0}'.")]
    InvalidCommandName(String),

    #[error("Command '{parent}' has more than one subcommand named or aliased '{name}'.")]
    DuplicateCommand { parent: String, name: String },

    #[error("Command '{0}' has neither a run handler nor subcommands.")]
    EmptyRouter(String),

    #[error("Command '{command}' declares argument '{argument}' more than once.")]
    DuplicateArgument { command: String, argument: String },

    #[error("Command '{command}': required argument '{argument}' follows an optional one.")]
    RequiredAfterOptional { command: String, argument: String },

    #[error("Command '{command}': invalid flag name '{flag}'.")]
    InvalidFlagName { command: String, flag: String },

    #[error("Command '{command}' declares flag '--{flag}' more than once.")]
    DuplicateFlag { command: String, flag: String },

    #[error("Command '{command}': flag '--{flag}' has invalid short form '-{short}'.")]
    InvalidShort {
        command: String,
        flag: String,
        short: char,
    },

    #[error("Command '{command}': short form '-{short}' is used by both '--{first}' and '--{second}'.")]
    DuplicateShort {
        command: String,
        short: char,
        first: String,
        second: String,
    },

    #[error("Command '{command}': destination '{destination}' is used by more than one flag.")]
    DuplicateDestination {
        command: String,
        destination: String,
    },

    #[error("Command '{command}': flag '--{flag}' cannot be both required and have a default.")]
    RequiredWithDefault { command: String, flag: String },

    #[error("Command '{command}': default '{literal}' of flag '--{flag}' is not a valid {kind}.")]
    InvalidDefault {
        command: String,
        flag: String,
        literal: String,
        kind: FlagKind,
    },
}

/// A mistake in how the command line was spelled or what it left out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Unknown command '{token}' for '{path}'.")]
    UnknownCommand { path: String, token: String },

    #[error("'{path}' requires a subcommand: {}.", available.join(", "))]
    CommandRequired {
        path: String,
        available: Vec<String>,
    },

    #[error("Unknown flag '{0}'.")]
    UnknownFlag(String),

    #[error("Missing value for flag '{0}'.")]
    MissingFlagValue(String),

    #[error("Too many arguments for '{command}': unexpected '{}'.", extra.join(" "))]
    TooManyArguments { command: String, extra: Vec<String> },

    #[error("Missing required value for flag '--{0}'.")]
    MissingRequired(String),

    #[error("Missing required argument '{0}'.")]
    MissingArgument(String),

    #[error("Invalid value '{literal}' for flag '--{flag}': expected {kind}.")]
    InvalidValue {
        flag: String,
        literal: String,
        kind: FlagKind,
    },
}

/// Everything that can end a dispatch without success.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// An interactive prompt, or the invocation itself, was cancelled.
    #[error("Cancelled ({0}).")]
    Cancelled(CancelReason),

    /// A prompt failed for a reason other than cancellation.
    #[error(transparent)]
    Prompt(InputError),

    #[error(transparent)]
    Hook(#[from] HookError),

    /// The command's run handler failed. The error is passed through as is.
    #[error(transparent)]
    Run(anyhow::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<InputError> for DispatchError {
    fn from(err: InputError) -> Self {
        match err.cancel_reason() {
            Some(reason) => DispatchError::Cancelled(reason),
            None => DispatchError::Prompt(err),
        }
    }
}

impl DispatchError {
    /// Wrap a run handler error. Prompt cancellations raised inside a handler
    /// keep their identity.
    pub(crate) fn from_run(err: anyhow::Error) -> Self {
        match err.downcast::<InputError>() {
            Ok(input) => input.into(),
            Err(other) => DispatchError::Run(other),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Cancelled(_))
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            DispatchError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, DispatchError::Usage(_))
    }

    pub fn usage(&self) -> Option<&UsageError> {
        match self {
            DispatchError::Usage(err) => Some(err),
            _ => None,
        }
    }

    /// Conventional process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::Usage(_) => 2,
            DispatchError::Cancelled(_) => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_messages_name_the_culprit() {
        let err = UsageError::InvalidValue {
            flag: "port".into(),
            literal: "abc".into(),
            kind: FlagKind::Integer,
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' for flag '--port': expected integer."
        );
        assert_eq!(
            UsageError::MissingRequired("token".into()).to_string(),
            "Missing required value for flag '--token'."
        );
        let required = UsageError::CommandRequired {
            path: "app remote".into(),
            available: vec!["add".into(), "rm".into()],
        };
        assert_eq!(
            required.to_string(),
            "'app remote' requires a subcommand: add, rm."
        );
    }

    #[test]
    fn input_cancellation_becomes_cancelled() {
        let err: DispatchError = InputError::Cancelled(CancelReason::User).into();
        assert!(err.is_cancelled());
        assert_eq!(err.exit_code(), 130);

        let err: DispatchError = InputError::NotInteractive("x".into()).into();
        assert!(matches!(err, DispatchError::Prompt(_)));
    }

    #[test]
    fn run_errors_keep_prompt_cancellation() {
        let wrapped = anyhow::Error::from(InputError::Cancelled(CancelReason::EndOfInput));
        assert_eq!(
            DispatchError::from_run(wrapped).cancel_reason(),
            Some(CancelReason::EndOfInput)
        );

        let plain = DispatchError::from_run(anyhow::anyhow!("disk full"));
        assert_eq!(plain.to_string(), "disk full");
        assert_eq!(plain.exit_code(), 1);
    }

    #[test]
    fn usage_is_exit_code_two() {
        let err: DispatchError = UsageError::UnknownFlag("--bogus".into()).into();
        assert!(err.is_usage());
        assert_eq!(err.exit_code(), 2);
    }
}
