pub mod attachments;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod paths;
pub mod remote;
pub mod search;
pub mod tags;
pub mod tui;
pub mod types;

#[cfg(test)]
mod test_guards;

pub use error::{JournalError, Result};
pub use fetch::fetch_full;
pub use remote::{Gateway, NoteService};
pub use search::{SearchIndex, Searchable};
pub use types::{Attachment, AttachmentKind, Entry, EntryPreview, UserId};
