//! Remote Store Gateway.
//!
//! Wraps a [`NoteService`] with the policy every caller needs:
//!
//! - the credential is verified once per gateway, and the outcome (success or
//!   failure) is shared by every concurrent and later caller
//! - every entry operation resolves identity first, so a bad credential fails
//!   before any entry-specific call is made
//! - full bodies are assembled by following content pages until the store
//!   reports there are no more
//! - search falls back to client-side ranking when the store cannot search

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{JournalError, Result};
use crate::search::SearchIndex;
use crate::types::{Entry, EntryPreview, UserId};

use super::decode::decode_note;
use super::error::InitFailure;
use super::{NewNote, NoteService, UploadRecord};

/// How many previews are scanned when ranking a query client-side.
pub const SEARCH_SCAN_LIMIT: usize = 200;

/// Content for a new entry.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub body: String,
    pub tags: Vec<String>,
    pub images: Vec<UploadRecord>,
    pub audios: Vec<UploadRecord>,
}

pub struct Gateway<S> {
    service: S,
    identity: OnceCell<std::result::Result<UserId, InitFailure>>,
}

impl<S: NoteService> Gateway<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            identity: OnceCell::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Resolve the user owning the credential.
    ///
    /// The verification call runs at most once; concurrent callers wait on
    /// the same attempt and all observe its outcome.
    pub async fn identity(&self) -> Result<UserId> {
        let outcome = self
            .identity
            .get_or_init(|| async {
                match self.service.verify_credential().await {
                    Ok(v) if v.valid && !v.user_id.trim().is_empty() => {
                        tracing::debug!(user = %v.user_id, "API key verified");
                        Ok(UserId(v.user_id))
                    }
                    Ok(_) => Err(InitFailure::Auth("API key invalid".to_string())),
                    Err(e) => Err(InitFailure::from(&e)),
                }
            })
            .await;
        outcome.clone().map_err(JournalError::from)
    }

    /// List entry previews, newest first unless a query ranks them.
    pub async fn list_entries(
        &self,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Vec<EntryPreview>> {
        let user = self.identity().await?;
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        match query {
            Some(q) if self.service.supports_search() => {
                let records = self.service.list_notes(&user, limit, Some(q)).await?;
                Ok(records.into_iter().map(|r| r.into_preview()).collect())
            }
            Some(q) => {
                tracing::debug!(query = q, "store cannot search; ranking locally");
                let records = self
                    .service
                    .list_notes(&user, limit.max(SEARCH_SCAN_LIMIT), None)
                    .await?;
                let index = SearchIndex::build(records.into_iter().map(|r| r.into_preview()));
                Ok(index
                    .search(q)
                    .into_iter()
                    .take(limit)
                    .map(Arc::unwrap_or_clone)
                    .collect())
            }
            None => {
                let records = self.service.list_notes(&user, limit, None).await?;
                let mut previews: Vec<EntryPreview> =
                    records.into_iter().map(|r| r.into_preview()).collect();
                previews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                previews.truncate(limit);
                Ok(previews)
            }
        }
    }

    /// Fetch the complete body of an entry, following every content page.
    pub async fn get_entry_body(&self, id: &str) -> Result<String> {
        let user = self.identity().await?;
        self.collect_body(&user, id).await
    }

    async fn collect_body(&self, user: &UserId, id: &str) -> Result<String> {
        let mut body = String::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .service
                .content_page(user, id, cursor.as_deref())
                .await?;
            pages += 1;

            for fragment in &page.fragments {
                body.push_str(fragment);
                body.push('\n');
            }

            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => {
                    return Err(JournalError::MalformedResponse(format!(
                        "note {id}: page {pages} reports more content but has no cursor"
                    )));
                }
            }
        }

        tracing::debug!(id, pages, "assembled entry body");
        Ok(body.trim().to_string())
    }

    /// Fetch an entry's metadata and complete body.
    pub async fn get_entry(&self, id: &str) -> Result<Entry> {
        let user = self.identity().await?;
        let document = self.service.get_note(&user, id).await?;
        let meta = decode_note(&document)?;
        let body = self.collect_body(&user, &meta.id).await?;

        Ok(Entry {
            id: meta.id,
            body,
            tags: meta.tags,
            created_at: meta.created_at,
            attachments: meta.attachments,
        })
    }

    pub async fn create_entry(&self, entry: NewEntry) -> Result<Entry> {
        let user = self.identity().await?;
        let note = NewNote {
            content: entry.body,
            tags: entry.tags,
            images: entry.images,
            audios: entry.audios,
        };
        let record = self.service.create_note(&user, &note).await?;
        let attachments = record.attachments();
        Ok(Entry {
            id: record.id,
            body: if record.content.is_empty() {
                note.content
            } else {
                record.content
            },
            tags: record.tags,
            created_at: record.created_at,
            attachments,
        })
    }

    pub async fn delete_entry(&self, id: &str) -> Result<()> {
        let user = self.identity().await?;
        match self.service.delete_note(&user, id).await {
            Err(JournalError::NotFound(_)) => Err(JournalError::NotFound(id.to_string())),
            other => other,
        }
    }
}
