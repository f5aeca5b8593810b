use std::sync::Arc;

use super::{is_interactive, shared_gateway};
use crate::display::format_entry_plain;
use crate::error::{JournalError, Result};
use crate::fetch::fetch_full;
use crate::tui::browser::{BrowserState, Flow, GatewayLoader, run_browser};
use crate::tui::browser::view::NO_ENTRIES;
use crate::types::Entry;

fn print_entries(entries: &[Entry]) {
    if entries.is_empty() {
        println!("{NO_ENTRIES}");
        return;
    }
    let rendered: Vec<String> = entries.iter().map(format_entry_plain).collect();
    print!("{}", rendered.join("\n"));
}

async fn fetch_plain(limit: usize, query: Option<&str>) -> Result<Vec<Entry>> {
    let gateway = shared_gateway().await?;
    let previews = gateway.list_entries(limit, query).await?;
    fetch_full(&gateway, &previews).await
}

async fn browse(state: BrowserState) -> Result<()> {
    let gateway = shared_gateway().await?;
    let loader = Arc::new(GatewayLoader::new(gateway));
    if let Some(entry) = run_browser(loader, state).await? {
        print!("{}", format_entry_plain(&entry));
    }
    Ok(())
}

/// List recent entries
pub async fn cmd_list(limit: usize) -> Result<()> {
    if is_interactive() {
        browse(BrowserState::new(Flow::List, "Journal Entries", limit)).await
    } else {
        print_entries(&fetch_plain(limit, None).await?);
        Ok(())
    }
}

/// Search entries
pub async fn cmd_search(query: Option<String>, limit: usize) -> Result<()> {
    if is_interactive() {
        let state = BrowserState::new(Flow::Search, "Search", limit)
            .with_query(query.unwrap_or_default());
        return browse(state).await;
    }

    let query = query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| JournalError::Other("a search query is required".to_string()))?;
    print_entries(&fetch_plain(limit, Some(&query)).await?);
    Ok(())
}
