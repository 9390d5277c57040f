//! Diagnostic logging setup.
//!
//! Every crate in the workspace emits `tracing` events; nothing is printed
//! unless a subscriber is installed. [`init`] installs a formatted one on
//! stderr, so stdout stays reserved for command output.
//!
//! ```rust,no_run
//! use helmsman::logging::{self, LevelFilter};
//!
//! // HELMSMAN_LOG=helmsman_dispatch=trace overrides the fallback.
//! logging::init(LevelFilter::WARN).ok();
//! ```

use thiserror::Error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

pub use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the filter directives.
pub const ENV_VAR: &str = "HELMSMAN_LOG";

/// Error returned when logging cannot be set up.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid HELMSMAN_LOG directive: {0}")]
    Filter(String),

    #[error("A global tracing subscriber is already installed.")]
    AlreadyInstalled,
}

/// Install a stderr subscriber filtered by `HELMSMAN_LOG`.
///
/// When the variable is unset or empty, events at `fallback` and above are
/// shown.
pub fn init(fallback: LevelFilter) -> Result<(), LoggingError> {
    let filter = filter_from(std::env::var(ENV_VAR).ok().as_deref(), fallback)?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}

/// Build the filter from the variable's value, if any.
pub fn filter_from(
    directives: Option<&str>,
    fallback: LevelFilter,
) -> Result<EnvFilter, LoggingError> {
    let builder = EnvFilter::builder().with_default_directive(Directive::from(fallback));
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => builder
            .parse(directives)
            .map_err(|err| LoggingError::Filter(err.to_string())),
        None => Ok(builder.parse_lossy("")),
    }
}
