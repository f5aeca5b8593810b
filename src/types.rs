//! Journal domain types shared by the gateway, the fetch engine, search and the UI.

use std::fmt;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

/// Display format for entry timestamps (local time).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The store-side identity resolved from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentKind::Image => write!(f, "image"),
            AttachmentKind::Audio => write!(f, "audio"),
        }
    }
}

/// A stored image or audio file attached to an entry.
///
/// `text` holds the extracted text of an image or the transcript of an audio
/// recording, when the store has produced one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub url: String,
    pub text: Option<String>,
}

/// A list-level view of an entry. The body may be truncated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPreview {
    pub id: String,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}

/// A fully fetched entry with its complete body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub attachments: Vec<Attachment>,
}

impl Entry {
    pub fn display_date(&self) -> String {
        format_timestamp(self.created_at)
    }

    pub fn images(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Image)
    }

    pub fn audio(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Audio)
    }
}

impl EntryPreview {
    pub fn display_date(&self) -> String {
        format_timestamp(self.created_at)
    }
}

/// Format a timestamp in the system time zone using [`DATE_FORMAT`].
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::system())
        .strftime(DATE_FORMAT)
        .to_string()
}
