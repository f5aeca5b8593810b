use jiff::Timestamp;

use super::{record_latest, run_blocking, shared_gateway};
use crate::error::Result;
use crate::tui::browser::view::NO_ENTRIES;
use crate::tui::viewer;

/// Show the most recent entry in full
pub async fn cmd_last() -> Result<()> {
    let gateway = shared_gateway().await?;
    let Some(latest) = gateway.list_entries(1, None).await?.into_iter().next() else {
        println!("{NO_ENTRIES}");
        return Ok(());
    };

    record_latest(latest.created_at, Timestamp::now());

    let entry = gateway.get_entry(&latest.id).await?;
    if atty::is(atty::Stream::Stdout) {
        let title = entry.display_date();
        run_blocking(move || viewer::view(&title, &entry.body)).await
    } else {
        println!("{}", entry.body);
        Ok(())
    }
}
