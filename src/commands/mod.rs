//! CLI subcommand implementations.

mod config;
mod create;
mod delete;
pub mod interactive;
mod last;
mod list;
mod show;
mod timesince;

pub use config::{cmd_config_path, cmd_config_set, cmd_config_show};
pub use create::{CreateOptions, cmd_create};
pub use delete::cmd_delete;
pub use last::cmd_last;
pub use list::{cmd_list, cmd_search};
pub use show::cmd_show;
pub use timesince::{cmd_timesince, time_since};

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::sync::OnceCell;

use crate::cache::MetricsCache;
use crate::config::Config;
use crate::error::{JournalError, Result};
use crate::remote::error::InitFailure;
use crate::remote::{Gateway, HttpNoteService};
use crate::tui::browser::{BrowserState, Flow, GatewayLoader, run_browser};
use crate::types::Entry;

/// Entries shown by the interactive pickers.
pub const DEFAULT_PAGE: usize = 25;
/// Entries fetched for a search.
pub const SEARCH_LIMIT: usize = 50;

type SharedGateway = Arc<Gateway<HttpNoteService>>;

static GATEWAY: OnceCell<std::result::Result<SharedGateway, InitFailure>> = OnceCell::const_new();

/// The process-wide gateway, connected on first use.
///
/// A failed connection attempt is remembered and reported to every caller.
pub async fn shared_gateway() -> Result<SharedGateway> {
    let outcome = GATEWAY
        .get_or_init(|| async {
            Config::load()
                .and_then(|config| HttpNoteService::connect(&config))
                .map(|service| Arc::new(Gateway::new(service)))
                .map_err(|e| InitFailure::from(&e))
        })
        .await;
    outcome.clone().map_err(JournalError::from)
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stdin)
}

/// Let the user pick an entry from the most recent ones.
pub(crate) async fn pick_entry(title: &str, limit: usize) -> Result<Option<Arc<Entry>>> {
    let gateway = shared_gateway().await?;
    let loader = Arc::new(GatewayLoader::new(gateway));
    run_browser(loader, BrowserState::new(Flow::List, title, limit)).await
}

/// Refresh the time-since metric from a known latest entry time.
///
/// The metric is advisory, so failures are only logged.
pub(crate) fn record_latest(latest: Timestamp, now: Timestamp) {
    let elapsed = Duration::try_from(now.duration_since(latest)).unwrap_or(Duration::ZERO);
    let stored = MetricsCache::time_since().and_then(|cache| cache.store(elapsed, now));
    if let Err(e) = stored {
        tracing::warn!(error = %e, "could not update time-since cache");
    }
}

/// Run blocking terminal or stdin work on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| JournalError::Other(format!("blocking task failed: {e}")))?
}

/// Error used when an interactive-only command runs without a terminal.
pub(crate) fn needs_terminal(what: &str) -> JournalError {
    JournalError::Other(format!("{what} requires an interactive terminal"))
}
