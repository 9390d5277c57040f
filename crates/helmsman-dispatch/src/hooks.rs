//! Lifecycle hooks for a command.
//!
//! Every command carries at most one hook per phase:
//!
//! ```text
//! resolved context
//!   → PRE  ← (validation, setup, extension injection)  failure aborts
//!   → RUN  ← the command's handler                     failure is surfaced
//!   → output written through the renderer
//!   → POST ← (cleanup, logging)                        only after RUN succeeded
//! ```
//!
//! A `post` failure is reported, but the output has already been written and
//! stays written.

use std::fmt;

use thiserror::Error;

use crate::context::{Context, Io};
use crate::handler::{FnHandler, Handler, HandlerResult, Output};

/// The phase at which a hook error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Pre,
    Post,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Pre => write!(f, "pre"),
            HookPhase::Post => write!(f, "post"),
        }
    }
}

/// Error returned by a `pre` or `post` hook.
#[derive(Debug, Error)]
#[error("{phase} hook failed: {message}")]
pub struct HookError {
    pub message: String,
    pub phase: HookPhase,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    pub fn pre(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::Pre,
            source: None,
        }
    }

    pub fn post(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::Post,
            source: None,
        }
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }

    pub(crate) fn in_phase(mut self, phase: HookPhase) -> Self {
        self.phase = phase;
        self
    }
}

/// `pre` hook signature. May insert extensions into the context.
pub type PreFn = Box<dyn FnMut(&mut Context, &mut Io<'_>) -> Result<(), HookError>>;

/// `post` hook signature. Sees the output that was written.
pub type PostFn = Box<dyn FnMut(&Context, &Output, &mut Io<'_>) -> Result<(), HookError>>;

/// The pre/run/post slots of one command.
#[derive(Default)]
pub struct Hooks {
    pre: Option<PreFn>,
    run: Option<Box<dyn Handler>>,
    post: Option<PostFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `pre` hook, replacing any previous one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use helmsman_dispatch::{Hooks, HookError};
    ///
    /// struct ApiClient { base_url: String }
    ///
    /// let hooks = Hooks::new().pre(|ctx, _io| {
    ///     let base_url = ctx
    ///         .flags()
    ///         .string("api")
    ///         .ok_or_else(|| HookError::pre("--api is not set"))?
    ///         .to_string();
    ///     ctx.extensions.insert(ApiClient { base_url });
    ///     Ok(())
    /// });
    /// assert!(hooks.has_pre());
    /// ```
    pub fn pre<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Context, &mut Io<'_>) -> Result<(), HookError> + 'static,
    {
        self.pre = Some(Box::new(f));
        self
    }

    /// Set the run handler from a closure.
    pub fn run<F>(self, f: F) -> Self
    where
        F: FnMut(&Context, &mut Io<'_>) -> HandlerResult + 'static,
    {
        self.handler(FnHandler::new(f))
    }

    /// Set the run handler from a [`Handler`] implementation.
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.run = Some(Box::new(handler));
        self
    }

    /// Set the `post` hook, replacing any previous one.
    pub fn post<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Context, &Output, &mut Io<'_>) -> Result<(), HookError> + 'static,
    {
        self.post = Some(Box::new(f));
        self
    }

    pub fn has_pre(&self) -> bool {
        self.pre.is_some()
    }

    pub fn has_run(&self) -> bool {
        self.run.is_some()
    }

    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    pub(crate) fn run_pre(&mut self, ctx: &mut Context, io: &mut Io<'_>) -> Result<(), HookError> {
        match self.pre.as_mut() {
            Some(pre) => pre(ctx, io).map_err(|e| e.in_phase(HookPhase::Pre)),
            None => Ok(()),
        }
    }

    /// `None` when the command has no run handler.
    pub(crate) fn run_handler(&mut self, ctx: &Context, io: &mut Io<'_>) -> Option<HandlerResult> {
        self.run.as_mut().map(|handler| handler.handle(ctx, io))
    }

    pub(crate) fn run_post(
        &mut self,
        ctx: &Context,
        output: &Output,
        io: &mut Io<'_>,
    ) -> Result<(), HookError> {
        match self.post.as_mut() {
            Some(post) => post(ctx, output, io).map_err(|e| e.in_phase(HookPhase::Post)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre", &self.pre.is_some())
            .field("run", &self.run.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hook_error_creation() {
        let err = HookError::pre("no credentials");
        assert_eq!(err.phase, HookPhase::Pre);
        assert_eq!(err.to_string(), "pre hook failed: no credentials");
    }

    #[test]
    fn empty_hooks_do_nothing() {
        let mut hooks = Hooks::new();
        let mut ctx = Context::default();
        let mut buf = Vec::new();
        let mut io = Io::new(&mut buf);

        assert!(hooks.run_pre(&mut ctx, &mut io).is_ok());
        assert!(hooks.run_handler(&ctx, &mut io).is_none());
        assert!(hooks.run_post(&ctx, &Output::Silent, &mut io).is_ok());
    }

    #[test]
    fn pre_injects_extensions() {
        struct Scope(&'static str);

        let mut hooks = Hooks::new().pre(|ctx, _io| {
            ctx.extensions.insert(Scope("admin"));
            Ok(())
        });
        let mut ctx = Context::default();
        let mut buf = Vec::new();
        let mut io = Io::new(&mut buf);
        hooks.run_pre(&mut ctx, &mut io).unwrap();
        assert_eq!(ctx.extensions.get::<Scope>().unwrap().0, "admin");
    }

    #[test]
    fn phase_is_fixed_by_slot() {
        let mut hooks = Hooks::new().post(|_, _, _| Err(HookError::pre("wrong label")));
        let ctx = Context::default();
        let mut buf = Vec::new();
        let mut io = Io::new(&mut buf);
        let err = hooks.run_post(&ctx, &Output::Silent, &mut io).unwrap_err();
        assert_eq!(err.phase, HookPhase::Post);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut hooks = Hooks::new()
            .run(|_, _| Ok(Output::Render(json!(1))))
            .run(|_, _| Ok(Output::Render(json!(2))));
        let ctx = Context::default();
        let mut buf = Vec::new();
        let mut io = Io::new(&mut buf);
        let output = hooks.run_handler(&ctx, &mut io).unwrap().unwrap();
        assert_eq!(output, Output::Render(json!(2)));
    }
}
