//! The pre → run → post execution pipeline.

use helmsman_input::CancelReason;
use tracing::{debug, trace};

use crate::context::{Context, Io};
use crate::error::{DispatchError, UsageError};
use crate::handler::Output;
use crate::hooks::Hooks;
use crate::render::Render;

/// Run one command's hooks against a resolved context.
///
/// The handler's output is written through `renderer` before `post` runs, so
/// a failing `post` cannot take it back. On success the output is returned
/// as well, for callers that want to inspect it.
pub fn execute(
    hooks: &mut Hooks,
    ctx: &mut Context,
    io: &mut Io<'_>,
    renderer: &dyn Render,
) -> Result<Output, DispatchError> {
    trace!(command = ?ctx.command_path(), "pre");
    hooks.run_pre(ctx, io)?;

    if ctx.is_cancelled() {
        debug!("invocation cancelled before run");
        return Err(DispatchError::Cancelled(CancelReason::Interrupted));
    }

    trace!(command = ?ctx.command_path(), "run");
    let output = match hooks.run_handler(ctx, io) {
        Some(result) => result.map_err(DispatchError::from_run)?,
        None => {
            return Err(UsageError::CommandRequired {
                path: ctx.command_path().join(" "),
                available: Vec::new(),
            }
            .into())
        }
    };

    emit(&output, io, renderer)?;

    trace!(command = ?ctx.command_path(), "post");
    hooks.run_post(ctx, &output, io)?;

    Ok(output)
}

/// Write `output` to the invocation's output handle.
pub fn emit(output: &Output, io: &mut Io<'_>, renderer: &dyn Render) -> Result<(), DispatchError> {
    let text = match output {
        Output::Render(data) => renderer.render(data)?,
        Output::Text(text) => text.clone(),
        Output::Silent => return Ok(()),
    };
    let out = io.out();
    out.write_all(text.as_bytes())?;
    if !text.is_empty() && !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
