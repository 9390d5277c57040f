//! Command resolution and dispatch for CLI applications.
//!
//! `helmsman-dispatch` turns a raw token list into a call to the right
//! handler:
//!
//! ```text
//! ["db", "migrate", "--dry-run", "v42"]
//!   → tree walk        db → migrate            (names and aliases)
//!   → flag resolver    dry-run = true (cli)    (cli > env > config > default)
//!   → argument binder  target = "v42"          (prompts for missing required)
//!   → pipeline         pre → run → output → post
//! ```
//!
//! # Building a tree
//!
//! ```rust
//! use helmsman_dispatch::{Arg, Command, CommandTree, Flag, Output};
//!
//! let tree = CommandTree::build(
//!     Command::new("app")
//!         .flag(Flag::boolean("verbose").short('v'))
//!         .subcommand(
//!             Command::new("db").subcommand(
//!                 Command::new("migrate")
//!                     .alias("m")
//!                     .flag(Flag::boolean("dry-run"))
//!                     .arg(Arg::optional("target"))
//!                     .run(|_ctx, _io| Ok(Output::Silent)),
//!             ),
//!         ),
//! )?;
//!
//! let tokens: Vec<String> = ["db", "m", "v42"].map(String::from).to_vec();
//! let resolution = tree.resolve(&tokens)?;
//! assert_eq!(tree.path_names(resolution.target()), ["db", "migrate"]);
//! assert_eq!(resolution.remaining, ["v42"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Construction problems (duplicate sibling names, a router without
//! children, a required argument after an optional one, bad flag
//! definitions) are [`BuildError`]s from [`CommandTree::build`]. Mistakes on
//! the command line are [`UsageError`]s.
//!
//! # Collaborators
//!
//! - [`Render`]: turns handler data into text ([`JsonRender`] by default)
//! - [`ConfigSource`]: configured flag values ([`NoConfig`], [`MapConfig`], JSON)
//! - [`EnvReader`](helmsman_input::EnvReader): environment variables
//! - [`Interactive`](helmsman_input::Interactive): prompts for missing arguments

mod binder;
mod config;
mod context;
mod dispatcher;
mod error;
mod flags;
mod handler;
mod hooks;
mod pipeline;
mod render;
mod resolver;
mod tree;

pub use binder::{bind, Arg, ArgSource, BoundArg, BoundArgs};
pub use config::{ConfigSource, MapConfig, NoConfig};
pub use context::{Context, Extensions, Io};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{BuildError, DispatchError, UsageError};
pub use flags::{Flag, FlagKind, FlagValues, ResolvedValue, Value, ValueSource};
pub use handler::{FnHandler, Handler, HandlerResult, Output};
pub use hooks::{HookError, HookPhase, Hooks, PostFn, PreFn};
pub use pipeline::{emit, execute};
pub use render::{JsonRender, Render, RenderError};
pub use resolver::{resolve_flags, ResolvedFlags};
pub use tree::{Command, CommandId, CommandTree, Node, Resolution};
