//! Per-invocation execution context.
//!
//! # State Management: App State vs Extensions
//!
//! [`Context`] offers two places to put state beyond the resolved values:
//!
//! | Field | Mutability | Lifetime | Purpose |
//! |-------|------------|----------|---------|
//! | `app_state` | Immutable | Dispatcher lifetime (shared via `Rc`) | Database, clients |
//! | `extensions` | Mutable in `pre` | One invocation | Request scope, timers |
//!
//! Resolved flags and bound arguments are fixed before any hook runs.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use helmsman_input::{CancelToken, Interactive};

use crate::binder::BoundArgs;
use crate::flags::FlagValues;

/// Type-safe container for injecting custom state into handlers.
///
/// # Example
///
/// ```rust
/// use helmsman_dispatch::Extensions;
///
/// struct ApiClient { base_url: String }
///
/// let mut ext = Extensions::new();
/// ext.insert(ApiClient { base_url: "https://api.example.com".into() });
///
/// let api = ext.get_required::<ApiClient>()?;
/// assert_eq!(api.base_url, "https://api.example.com");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value of the same type.
    pub fn insert<T: 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Like [`get`](Self::get), but a missing value is an error naming the type.
    pub fn get_required<T: 'static>(&self) -> Result<&T, anyhow::Error> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "Extension missing: type {} not found in context",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

/// Everything a hook or handler knows about the current invocation.
#[derive(Debug)]
pub struct Context {
    command_path: Vec<String>,
    flags: FlagValues,
    args: BoundArgs,
    cancel: CancelToken,
    app_state: Rc<Extensions>,

    /// Per-invocation state. `pre` hooks insert, later phases read.
    pub extensions: Extensions,
}

impl Context {
    pub fn new(
        command_path: Vec<String>,
        flags: FlagValues,
        args: BoundArgs,
        cancel: CancelToken,
        app_state: Rc<Extensions>,
    ) -> Self {
        Self {
            command_path,
            flags,
            args,
            cancel,
            app_state,
            extensions: Extensions::new(),
        }
    }

    /// Names of the matched commands below the root, e.g. `["db", "migrate"]`.
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    pub fn flags(&self) -> &FlagValues {
        &self.flags
    }

    pub fn args(&self) -> &BoundArgs {
        &self.args
    }

    /// Shorthand for `ctx.args().get(name)`.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name)
    }

    pub fn app_state(&self) -> &Extensions {
        &self.app_state
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(
            Vec::new(),
            FlagValues::new(),
            BoundArgs::default(),
            CancelToken::new(),
            Rc::new(Extensions::new()),
        )
    }
}

/// Input and output handles owned by the active invocation.
pub struct Io<'a> {
    out: &'a mut dyn Write,
    prompter: Option<&'a mut (dyn Interactive + 'a)>,
}

impl<'a> Io<'a> {
    /// Output only; prompting is unavailable.
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self {
            out,
            prompter: None,
        }
    }

    pub fn with_prompter(mut self, prompter: &'a mut (dyn Interactive + 'a)) -> Self {
        self.prompter = Some(prompter);
        self
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// The prompter, if one is attached.
    pub fn prompter(&mut self) -> Option<&mut (dyn Interactive + 'a)> {
        self.prompter.as_deref_mut()
    }

    /// Whether a prompt would reach a human.
    pub fn is_interactive(&self) -> bool {
        self.prompter
            .as_deref()
            .is_some_and(|p| p.is_interactive())
    }
}

impl fmt::Debug for Io<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Io")
            .field("has_prompter", &self.prompter.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helmsman_input::{MockTerminal, Prompter};

    #[test]
    fn extensions_insert_get_replace() {
        struct Counter(u32);

        let mut ext = Extensions::new();
        assert!(ext.insert(Counter(1)).is_none());
        let old = ext.insert(Counter(2)).unwrap();
        assert_eq!(old.0, 1);

        ext.get_mut::<Counter>().unwrap().0 += 10;
        assert_eq!(ext.get::<Counter>().unwrap().0, 12);
        assert_eq!(ext.len(), 1);

        assert_eq!(ext.remove::<Counter>().unwrap().0, 12);
        assert!(!ext.contains::<Counter>());
    }

    #[test]
    fn get_required_names_the_type() {
        #[derive(Debug)]
        struct Missing;
        let err = Extensions::new().get_required::<Missing>().unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn context_exposes_cancel_state() {
        let token = CancelToken::new();
        let ctx = Context::new(
            vec!["db".into(), "migrate".into()],
            FlagValues::new(),
            BoundArgs::default(),
            token.clone(),
            Rc::new(Extensions::new()),
        );
        assert_eq!(ctx.command_path(), ["db", "migrate"]);
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn io_without_prompter_is_not_interactive() {
        let mut buf = Vec::new();
        let mut io = Io::new(&mut buf);
        assert!(!io.is_interactive());
        assert!(io.prompter().is_none());
        write!(io.out(), "hello").unwrap();
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn io_with_prompter() {
        let mut buf = Vec::new();
        let mut prompter = Prompter::new(MockTerminal::with_lines(["Alice"]));
        let mut io = Io::new(&mut buf).with_prompter(&mut prompter);
        assert!(io.is_interactive());
        let name = io.prompter().unwrap().text("Name").unwrap();
        assert_eq!(name, "Alice");
    }
}
