use std::time::Duration;

use jiff::Timestamp;

use super::{record_latest, shared_gateway};
use crate::cache::MetricsCache;
use crate::display::format_time_since;
use crate::error::{JournalError, Result};

/// Printed when the metric cannot be computed.
pub const UNKNOWN: &str = "???";

/// Time since the most recent entry, served from the cache when fresh.
pub async fn time_since() -> Result<Duration> {
    let now = Timestamp::now();
    let cache = MetricsCache::time_since()?;
    if let Ok(value) = cache.load(now) {
        return Ok(value);
    }

    let gateway = shared_gateway().await?;
    let latest = gateway
        .list_entries(1, None)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| JournalError::Other("journal has no entries".to_string()))?;

    record_latest(latest.created_at, now);
    Ok(Duration::try_from(now.duration_since(latest.created_at)).unwrap_or(Duration::ZERO))
}

/// Print the time since the most recent entry, e.g. `5h` or `3d`
///
/// Never fails: problems are logged and `???` is printed instead, so the
/// command is safe to embed in a shell prompt.
pub async fn cmd_timesince() -> Result<()> {
    match time_since().await {
        Ok(elapsed) => println!("{}", format_time_since(elapsed)),
        Err(e) => {
            tracing::debug!(error = %e, "cannot compute time since last entry");
            println!("{UNKNOWN}");
        }
    }
    Ok(())
}
