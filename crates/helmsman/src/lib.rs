//! # Helmsman - Command Trees and Interactive Input
//!
//! Helmsman turns a process's argument vector into a call to one command
//! handler. It provides:
//!
//! - A command tree with aliases, resolved greedily from the leftmost token
//! - Typed flags whose values come from the command line, the environment,
//!   configuration or a default, in that order
//! - Positional arguments that are prompted for when missing and a terminal
//!   is attached
//! - A pre → run → post pipeline with JSON output by default
//! - Text, confirm, select and multi-select prompts driven by an explicit
//!   state machine
//!
//! This crate wires the real process environment, terminal and stdout
//! together. The pieces live in [`helmsman_dispatch`] and [`helmsman_input`]
//! and are re-exported here.
//!
//! ## Quick Start
//!
//! ```rust
//! use helmsman::{App, Arg, Command, Flag, MockEnv, MockTerminal, Output};
//! use serde_json::json;
//!
//! let mut app = App::builder(
//!     Command::new("app").subcommand(
//!         Command::new("greet")
//!             .alias("hello")
//!             .flag(Flag::boolean("shout").short('s'))
//!             .arg(Arg::required("name").prompt("Name"))
//!             .run(|ctx, _io| {
//!                 let name = ctx.arg("name").unwrap_or_default();
//!                 let greeting = if ctx.flags().boolean("shout") {
//!                     format!("HELLO, {}!", name.to_uppercase())
//!                 } else {
//!                     format!("Hello, {name}!")
//!                 };
//!                 Ok(Output::Render(json!({ "greeting": greeting })))
//!             }),
//!     ),
//! )
//! .build()
//! .unwrap();
//!
//! // In a binary: std::process::exit(app.run());
//! let transcript = app.run_to_string(
//!     &["hello", "-s"],
//!     &MockEnv::new(),
//!     MockTerminal::with_lines(["Ann"]),
//! );
//! assert!(transcript.result.is_ok());
//! assert!(transcript.stdout.contains("HELLO, ANN!"));
//! ```
//!
//! ## Where Values Come From
//!
//! For each flag the first source that has a value wins:
//!
//! 1. The command line (`--port 9000`, `--port=9000`, `-p 9000`, `--no-verbose`)
//! 2. The flag's environment variable, if declared and non-empty
//! 3. The [`ConfigSource`] given to the builder
//! 4. The flag's default
//!
//! Flags declared on an ancestor are visible to its descendants. A
//! descendant's flag of the same name shadows the ancestor's.
//!
//! ## Logging
//!
//! Resolution steps, prompt transitions and hook phases are emitted as
//! `tracing` events. [`logging::init`] installs a stderr subscriber filtered
//! by the `HELMSMAN_LOG` variable.

mod app;
pub mod logging;

pub use app::{App, AppBuilder, Transcript};

pub use helmsman_dispatch::{
    bind, emit, execute, resolve_flags, Arg, ArgSource, BoundArg, BoundArgs, BuildError, Command,
    CommandId, CommandTree, ConfigSource, Context, DispatchError, Dispatcher, DispatcherBuilder,
    Extensions, Flag, FlagKind, FlagValues, FnHandler, Handler, HandlerResult, HookError,
    HookPhase, Hooks, Io, JsonRender, MapConfig, NoConfig, Node, Output, PostFn, PreFn, Render,
    RenderError, Resolution, ResolvedFlags, ResolvedValue, UsageError, Value, ValueSource,
};

pub use helmsman_input::{
    complete, Answer, CancelReason, CancelToken, Completion, ConsoleStyler, ConsoleTerminal,
    EnvReader, Event, Frame, InputError, Interactive, Key, MockEnv, MockTerminal, PlainStyler,
    PromptKind, PromptMachine, PromptSpec, PromptState, Prompter, RealEnv, StyleToken, Styler,
    Terminal,
};
