//! Tying the pieces together.
//!
//! ```text
//! tokens → tree walk → merged flags → resolver → binder (may prompt) → pipeline
//! ```

use std::fmt;
use std::rc::Rc;

use helmsman_input::{CancelToken, EnvReader};
use tracing::debug;

use crate::binder::bind;
use crate::config::{ConfigSource, NoConfig};
use crate::context::{Context, Extensions, Io};
use crate::error::{BuildError, DispatchError};
use crate::handler::Output;
use crate::pipeline::execute;
use crate::render::{JsonRender, Render};
use crate::resolver::resolve_flags;
use crate::tree::{Command, CommandId, CommandTree};

/// Resolves invocations against a command tree and runs them.
///
/// # Example
///
/// ```
/// use helmsman_dispatch::{Command, Dispatcher, Flag, Io, Output};
/// use helmsman_input::{CancelToken, MockEnv};
///
/// let mut dispatcher = Dispatcher::builder(
///     Command::new("app").subcommand(
///         Command::new("serve")
///             .flag(Flag::integer("port").env("MYAPP_PORT").default("8080"))
///             .run(|ctx, _io| Ok(Output::text(format!("port {}", ctx.flags().integer("port").unwrap_or(0))))),
///     ),
/// )
/// .build()
/// .unwrap();
///
/// let env = MockEnv::new().with_var("MYAPP_PORT", "9090");
/// let mut out = Vec::new();
/// let mut io = Io::new(&mut out);
/// dispatcher.dispatch(&["serve"], &env, &CancelToken::new(), &mut io).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "port 9090\n");
/// ```
pub struct Dispatcher {
    tree: CommandTree,
    renderer: Box<dyn Render>,
    config: Box<dyn ConfigSource>,
    app_state: Rc<Extensions>,
}

impl Dispatcher {
    pub fn builder(root: Command) -> DispatcherBuilder {
        DispatcherBuilder::new(root)
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Resolve `args` into the matched command and its context without
    /// running anything but the binder's prompts.
    ///
    /// `args` excludes the program name.
    pub fn prepare<S: AsRef<str>>(
        &self,
        args: &[S],
        env: &dyn EnvReader,
        cancel: &CancelToken,
        io: &mut Io<'_>,
    ) -> Result<(CommandId, Context), DispatchError> {
        let tokens: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();

        let resolution = self.tree.resolve(&tokens)?;
        let target = resolution.target();
        let command_path = self.tree.path_names(target);
        debug!(command = %self.tree.display_path(target), "matched command");

        let flags = self.tree.merged_flags(target);
        let resolved = resolve_flags(
            &flags,
            &resolution.remaining,
            env,
            self.config.as_ref(),
            &command_path,
        )?;

        let node = self.tree.node(target);
        let args = bind(
            &self.tree.display_path(target),
            node.args(),
            resolved.positionals,
            io.prompter(),
        )?;

        let ctx = Context::new(
            command_path,
            resolved.values,
            args,
            cancel.clone(),
            Rc::clone(&self.app_state),
        );
        Ok((target, ctx))
    }

    /// Resolve `args`, then run the matched command's pipeline.
    ///
    /// `args` excludes the program name.
    pub fn dispatch<S: AsRef<str>>(
        &mut self,
        args: &[S],
        env: &dyn EnvReader,
        cancel: &CancelToken,
        io: &mut Io<'_>,
    ) -> Result<Output, DispatchError> {
        let (target, mut ctx) = self.prepare(args, env, cancel, io)?;
        let hooks = self.tree.hooks_mut(target);
        execute(hooks, &mut ctx, io, self.renderer.as_ref())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.tree.len())
            .field("app_state", &self.app_state)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    root: Command,
    renderer: Box<dyn Render>,
    config: Box<dyn ConfigSource>,
    app_state: Extensions,
}

impl DispatcherBuilder {
    pub fn new(root: Command) -> Self {
        Self {
            root,
            renderer: Box::new(JsonRender::default()),
            config: Box::new(NoConfig),
            app_state: Extensions::new(),
        }
    }

    /// Replace the default pretty-JSON renderer.
    pub fn renderer(mut self, renderer: impl Render + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Configuration consulted between the environment and flag defaults.
    pub fn config(mut self, config: impl ConfigSource + 'static) -> Self {
        self.config = Box::new(config);
        self
    }

    /// Add app-level state shared immutably with every invocation.
    pub fn app_state<T: 'static>(mut self, state: T) -> Self {
        self.app_state.insert(state);
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        Ok(Dispatcher {
            tree: CommandTree::build(self.root)?,
            renderer: self.renderer,
            config: self.config,
            app_state: Rc::new(self.app_state),
        })
    }
}
