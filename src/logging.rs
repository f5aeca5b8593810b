//! Diagnostic logging setup.
//!
//! Logs go to stderr so they never mix with entry text printed on stdout.
//! Verbosity is controlled with `ETU_LOG` using `tracing_subscriber` filter
//! syntax (e.g. `ETU_LOG=etu=debug`). The default is `warn`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ETU_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Calling this more than once is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}
