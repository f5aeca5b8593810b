//! Concurrent Fetch Engine.
//!
//! Turns a list of previews into fully fetched entries. Every preview gets its
//! own task, so total latency tracks the slowest entry rather than the sum.
//! Output order always matches input order. The first failure cancels the
//! remaining tasks and is returned.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::error::{JournalError, Result};
use crate::remote::{Gateway, NoteService};
use crate::types::{Entry, EntryPreview};

/// Fetch the complete entry for every preview, preserving order.
///
/// Dropping the returned future aborts all in-flight per-entry tasks.
pub async fn fetch_full<S: NoteService>(
    gateway: &Arc<Gateway<S>>,
    previews: &[EntryPreview],
) -> Result<Vec<Entry>> {
    if previews.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(count = previews.len(), "fetching full entries");

    let mut tasks = JoinSet::new();
    for (index, preview) in previews.iter().enumerate() {
        let gateway = Arc::clone(gateway);
        let id = preview.id.clone();
        tasks.spawn(async move { (index, gateway.get_entry(&id).await) });
    }

    let mut slots: Vec<Option<Entry>> = vec![None; previews.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined
            .map_err(|e| JournalError::Other(format!("entry fetch task failed: {e}")))?;
        match outcome {
            Ok(entry) => slots[index] = Some(entry),
            Err(e) => {
                tracing::debug!(id = %previews[index].id, error = %e, "entry fetch failed");
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    slots
        .into_iter()
        .zip(previews)
        .map(|(slot, preview)| {
            slot.ok_or_else(|| {
                JournalError::Other(format!("entry {} was never fetched", preview.id))
            })
        })
        .collect()
}
