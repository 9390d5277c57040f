//! App struct and the process-level entry points.
//!
//! [`App`] owns a [`Dispatcher`] and runs it against the real process: the
//! argument vector, the environment, a [`ConsoleTerminal`] for prompts and
//! stdout for output. Errors are printed to stderr and turned into an exit
//! code.
//!
//! # Single-Threaded Design
//!
//! CLI applications are single-threaded: parse args → run one handler → output → exit.
//! Handlers use `&mut self` and `FnMut`, allowing natural Rust patterns without
//! forcing interior mutability wrappers (`Arc<Mutex<_>>`).

use std::io::{self, Write};

use helmsman_dispatch::{
    BuildError, Command, ConfigSource, DispatchError, Dispatcher, DispatcherBuilder, Io, Output,
    Render,
};
use helmsman_input::{
    CancelToken, ConsoleStyler, ConsoleTerminal, EnvReader, PlainStyler, Prompter, RealEnv,
    Terminal,
};
use tracing::{debug, warn};

/// Main entry point for a helmsman CLI.
///
/// ```rust,no_run
/// use helmsman::{App, Command, Output};
///
/// let mut app = App::builder(
///     Command::new("app").run(|_ctx, _io| Ok(Output::text("hi"))),
/// )
/// .build()
/// .expect("valid command tree");
///
/// std::process::exit(app.run());
/// ```
pub struct App {
    dispatcher: Dispatcher,
    cancel: CancelToken,
    styled: bool,
}

/// What one captured invocation produced.
#[derive(Debug)]
pub struct Transcript<T> {
    /// The dispatch result.
    pub result: Result<Output, DispatchError>,
    /// Everything written to the output handle.
    pub stdout: String,
    /// The terminal, with whatever it recorded.
    pub terminal: T,
}

impl<T> Transcript<T> {
    /// The exit code [`App::run_from`] would return for this result.
    pub fn exit_code(&self) -> i32 {
        exit_code(&self.result)
    }
}

impl App {
    /// Creates a new builder for constructing an App instance.
    pub fn builder(root: Command) -> AppBuilder {
        AppBuilder::new(root)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The token checked by prompts and before each handler runs.
    ///
    /// Cancel it from a signal handler to interrupt the invocation.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Runs the CLI against the current process's arguments.
    ///
    /// Returns the exit code: `0` on success, `2` for usage errors, `130`
    /// for cancellation, `1` otherwise.
    pub fn run(&mut self) -> i32 {
        self.run_from(std::env::args())
    }

    /// Runs the CLI against `argv`, whose first element is the program name.
    pub fn run_from<I, S>(&mut self, argv: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = argv.into_iter().skip(1).map(Into::into).collect();
        debug!(?args, "running");

        let mut prompter = self.console_prompter();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let result = self.dispatch_with(&args, &RealEnv, &mut prompter, &mut out);

        if let Err(err) = &result {
            report(err);
        }
        exit_code(&result)
    }

    /// Dispatch `args` with explicit collaborators.
    ///
    /// `args` excludes the program name. The prompter's cancel token is
    /// replaced by the app's.
    pub fn dispatch_with<S, T>(
        &mut self,
        args: &[S],
        env: &dyn EnvReader,
        prompter: &mut Prompter<T>,
        out: &mut dyn Write,
    ) -> Result<Output, DispatchError>
    where
        S: AsRef<str>,
        T: Terminal,
    {
        prompter.set_cancel_token(self.cancel.clone());
        let mut io = Io::new(out).with_prompter(prompter);
        self.dispatcher.dispatch(args, env, &self.cancel, &mut io)
    }

    /// Runs the CLI and captures its output instead of printing it.
    ///
    /// Nothing is written to stderr; the error, if any, is in the
    /// transcript's `result`.
    pub fn run_to_string<S, T>(
        &mut self,
        args: &[S],
        env: &dyn EnvReader,
        terminal: T,
    ) -> Transcript<T>
    where
        S: AsRef<str>,
        T: Terminal,
    {
        let mut prompter = Prompter::new(terminal);
        let mut out = Vec::new();
        let result = self.dispatch_with(args, env, &mut prompter, &mut out);
        Transcript {
            result,
            stdout: String::from_utf8_lossy(&out).into_owned(),
            terminal: prompter.into_terminal(),
        }
    }

    fn console_prompter(&self) -> Prompter<ConsoleTerminal> {
        let prompter = Prompter::new(ConsoleTerminal::stderr());
        if self.styled {
            prompter.with_styler(ConsoleStyler::default())
        } else {
            prompter.with_styler(PlainStyler)
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("dispatcher", &self.dispatcher)
            .field("styled", &self.styled)
            .finish_non_exhaustive()
    }
}

fn exit_code(result: &Result<Output, DispatchError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.exit_code(),
    }
}

fn report(err: &DispatchError) {
    if err.is_cancelled() {
        debug!(reason = ?err.cancel_reason(), "cancelled");
        eprintln!("{err}");
        return;
    }
    warn!(error = %err, "invocation failed");
    let label = console::style("error:").red().bold();
    eprintln!("{label} {err}");
    if let DispatchError::Run(inner) = err {
        for cause in inner.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
}

/// Builder for [`App`].
pub struct AppBuilder {
    dispatcher: DispatcherBuilder,
    cancel: CancelToken,
    styled: bool,
}

impl AppBuilder {
    pub fn new(root: Command) -> Self {
        Self {
            dispatcher: Dispatcher::builder(root),
            cancel: CancelToken::new(),
            styled: true,
        }
    }

    /// Replace the default pretty-JSON renderer.
    pub fn renderer(mut self, renderer: impl Render + 'static) -> Self {
        self.dispatcher = self.dispatcher.renderer(renderer);
        self
    }

    /// Configuration consulted between the environment and flag defaults.
    pub fn config(mut self, config: impl ConfigSource + 'static) -> Self {
        self.dispatcher = self.dispatcher.config(config);
        self
    }

    /// Add app-level state shared with every handler.
    pub fn app_state<T: 'static>(mut self, state: T) -> Self {
        self.dispatcher = self.dispatcher.app_state(state);
        self
    }

    /// Use an existing cancel token, e.g. one tripped by a signal handler.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Draw prompts without colors.
    pub fn plain(mut self) -> Self {
        self.styled = false;
        self
    }

    /// Validates the command tree.
    pub fn build(self) -> Result<App, BuildError> {
        Ok(App {
            dispatcher: self.dispatcher.build()?,
            cancel: self.cancel,
            styled: self.styled,
        })
    }
}
