use super::{DEFAULT_PAGE, is_interactive, needs_terminal, pick_entry, shared_gateway};
use crate::display::format_entry_detail;
use crate::error::Result;

/// Show an entry with its tags and attachments
pub async fn cmd_show(id: Option<String>) -> Result<()> {
    let entry = match id {
        Some(id) => shared_gateway().await?.get_entry(&id).await?,
        None => {
            if !is_interactive() {
                return Err(needs_terminal("choosing an entry to show"));
            }
            match pick_entry("Select entry", DEFAULT_PAGE).await? {
                Some(entry) => (*entry).clone(),
                None => return Ok(()),
            }
        }
    };

    print!("{}", format_entry_detail(&entry));
    Ok(())
}
