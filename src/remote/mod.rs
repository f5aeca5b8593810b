//! Access to the remote journal store.
//!
//! [`NoteService`] is the transport boundary: one method per store call, no
//! policy. [`Gateway`] layers identity resolution, search fallback and body
//! pagination on top of any transport. [`HttpNoteService`] is the production
//! transport.

pub mod decode;
pub mod error;
pub mod gateway;
pub mod http;

use std::future::Future;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Attachment, AttachmentKind, EntryPreview, UserId};

pub use gateway::{Gateway, NewEntry, SEARCH_SCAN_LIMIT};
pub use http::HttpNoteService;

/// Prefix every store credential carries.
pub const CREDENTIAL_PREFIX: &str = "etu_";

/// Add the credential prefix when the user supplied a bare key.
pub fn normalize_credential(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(CREDENTIAL_PREFIX) {
        raw.to_string()
    } else {
        format!("{CREDENTIAL_PREFIX}{raw}")
    }
}

/// Result of checking a credential with the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verification {
    pub valid: bool,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioRecord {
    pub url: String,
    #[serde(default)]
    pub transcribed_text: Option<String>,
}

/// A note as it appears in list responses and create responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub audios: Vec<AudioRecord>,
}

impl NoteRecord {
    pub fn into_preview(self) -> EntryPreview {
        EntryPreview {
            id: self.id,
            body: self.content,
            tags: self.tags,
            created_at: self.created_at,
        }
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        let images = self.images.iter().map(|i| Attachment {
            kind: AttachmentKind::Image,
            url: i.url.clone(),
            text: i.extracted_text.clone(),
        });
        let audio = self.audios.iter().map(|a| Attachment {
            kind: AttachmentKind::Audio,
            url: a.url.clone(),
            text: a.transcribed_text.clone(),
        });
        images.chain(audio).collect()
    }
}

/// One page of a note's body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPage {
    #[serde(default)]
    pub fragments: Vec<String>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// A base64-encoded file sent along with a new note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub data: String,
    pub mime_type: String,
}

/// Request body for creating a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNote {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<UploadRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audios: Vec<UploadRecord>,
}

/// Transport-level interface to the journal store.
///
/// Implementations perform exactly one store call per method and map
/// failures onto [`crate::JournalError`] variants. Identity checks, search
/// fallback and pagination live in [`Gateway`].
pub trait NoteService: Send + Sync + 'static {
    /// Check the configured credential and resolve the owning user.
    fn verify_credential(&self) -> impl Future<Output = Result<Verification>> + Send;

    /// List notes newest first, optionally filtered by a store-side query.
    fn list_notes(
        &self,
        user: &UserId,
        limit: usize,
        query: Option<&str>,
    ) -> impl Future<Output = Result<Vec<NoteRecord>>> + Send;

    /// Fetch a note's metadata as an untyped document.
    fn get_note(
        &self,
        user: &UserId,
        id: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send;

    /// Fetch one page of a note's body.
    fn content_page(
        &self,
        user: &UserId,
        id: &str,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<ContentPage>> + Send;

    fn create_note(
        &self,
        user: &UserId,
        note: &NewNote,
    ) -> impl Future<Output = Result<NoteRecord>> + Send;

    fn delete_note(&self, user: &UserId, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Whether `list_notes` honours the `query` argument.
    fn supports_search(&self) -> bool {
        true
    }
}
