use owo_colors::OwoColorize;

use super::interactive::confirm;
use super::{DEFAULT_PAGE, is_interactive, needs_terminal, pick_entry, shared_gateway};
use crate::display::summary_line;
use crate::error::{JournalError, Result};

/// Delete an entry, chosen by ID or from a picker
pub async fn cmd_delete(id: Option<String>, yes: bool) -> Result<()> {
    let (id, description) = match id {
        Some(id) => (id.clone(), format!("Delete entry {id}")),
        None => {
            if !is_interactive() {
                return Err(needs_terminal("choosing an entry to delete"));
            }
            let Some(entry) = pick_entry("Select entry to delete", DEFAULT_PAGE).await? else {
                return Ok(());
            };
            (
                entry.id.clone(),
                format!("Delete \"{}\"", summary_line(&entry, 60)),
            )
        }
    };

    if !yes && !confirm(&description)? {
        println!("Aborted.");
        return Ok(());
    }

    let gateway = shared_gateway().await?;
    match gateway.delete_entry(&id).await {
        Ok(()) => {
            println!("Deleted entry {}", id.cyan());
            Ok(())
        }
        Err(JournalError::NotFound(id)) => {
            eprintln!("Entry {id} was not found; nothing deleted.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
