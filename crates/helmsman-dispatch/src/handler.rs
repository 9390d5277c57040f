//! Command handler types.
//!
//! A run handler receives the resolved [`Context`] and the invocation's
//! [`Io`] and returns an [`Output`]. It does not format anything itself:
//! structured output goes through the dispatcher's [`Render`](crate::Render)
//! collaborator.

use serde::Serialize;

use crate::context::{Context, Io};

/// What a handler produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Structured data handed to the output renderer.
    Render(serde_json::Value),
    /// Text written as is.
    Text(String),
    /// Nothing to write.
    Silent,
}

impl Output {
    /// Serialize `data` into an [`Output::Render`].
    pub fn render<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(data).map(Output::Render)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Output::Render(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Output::Text(_))
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Output::Silent)
    }
}

/// The result type for run handlers.
///
/// Enables use of the `?` operator for error propagation; errors reach the
/// caller unchanged.
pub type HandlerResult = Result<Output, anyhow::Error>;

/// Trait for run handlers.
///
/// Handlers take `&mut self`, so stateful handlers need no interior
/// mutability.
///
/// # Example
///
/// ```rust
/// use helmsman_dispatch::{Context, Handler, HandlerResult, Io, Output};
///
/// struct Counter { count: u32 }
///
/// impl Handler for Counter {
///     fn handle(&mut self, _ctx: &Context, _io: &mut Io<'_>) -> HandlerResult {
///         self.count += 1;
///         Ok(Output::Render(self.count.into()))
///     }
/// }
/// ```
pub trait Handler {
    fn handle(&mut self, ctx: &Context, io: &mut Io<'_>) -> HandlerResult;
}

/// Adapts a closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: FnMut(&Context, &mut Io<'_>) -> HandlerResult,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: FnMut(&Context, &mut Io<'_>) -> HandlerResult,
{
    fn handle(&mut self, ctx: &Context, io: &mut Io<'_>) -> HandlerResult {
        (self.f)(ctx, io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_render_serializes() {
        #[derive(Serialize)]
        struct Greeting {
            name: &'static str,
        }
        let output = Output::render(&Greeting { name: "Alice" }).unwrap();
        assert_eq!(output, Output::Render(json!({"name": "Alice"})));
        assert!(output.is_render());
        assert!(Output::Silent.is_silent());
        assert!(Output::text("x").is_text());
    }

    #[test]
    fn fn_handler_keeps_state_between_calls() {
        let mut calls = 0;
        let mut handler = FnHandler::new(move |_ctx: &Context, _io: &mut Io<'_>| {
            calls += 1;
            Ok(Output::Render(json!(calls)))
        });

        let ctx = Context::default();
        let mut buf = Vec::new();
        let mut io = Io::new(&mut buf);
        handler.handle(&ctx, &mut io).unwrap();
        let second = handler.handle(&ctx, &mut io).unwrap();
        assert_eq!(second, Output::Render(json!(2)));
    }
}
