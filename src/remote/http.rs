//! HTTP transport for the journal store.
//!
//! # Security Note - Logging
//!
//! The credential is kept in a `SecretBox` and only exposed while building the
//! `Authorization` header. The header value goes through [`RedactedHeader`],
//! whose `Display` and `Debug` never print the key, so enabling reqwest debug
//! logging does not leak it through our own types.

use std::fmt;
use std::time::Duration;

use reqwest::header;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretBox};
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{JournalError, Result};
use crate::types::UserId;

use super::error::ApiError;
use super::{ContentPage, NewNote, NoteRecord, NoteService, Verification, normalize_credential};

const USER_AGENT: &str = concat!("etu/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Wrapper for sensitive header values that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value).map_err(|_| {
            JournalError::Config("API key contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct NoteList {
    #[serde(default)]
    notes: Vec<NoteRecord>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Journal store client speaking JSON over HTTP.
pub struct HttpNoteService {
    client: Client,
    base: Url,
    raw_key: SecretBox<String>,
    credential: SecretBox<String>,
}

impl HttpNoteService {
    /// Build a client from configuration.
    ///
    /// Configures the HTTP client with a 30s connect timeout and a 60s
    /// per-request timeout.
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let api_key = config.api_key().ok_or_else(|| {
            JournalError::Auth("API key not set. Run: etu config set api_key <key>".to_string())
        })?;
        Self::new(&config.target(), &api_key)
    }

    pub fn new(target: &str, api_key: &str) -> Result<Self> {
        let mut target = target.trim().to_string();
        if !target.ends_with('/') {
            target.push('/');
        }
        let base = Url::parse(&target)
            .map_err(|e| JournalError::Config(format!("invalid target '{target}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(JournalError::Config(format!(
                "target '{target}' cannot be used as a base URL"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base,
            raw_key: SecretBox::new(Box::new(api_key.trim().to_string())),
            credential: SecretBox::new(Box::new(normalize_credential(api_key))),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| JournalError::Config(format!("invalid target '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn notes_endpoint(&self, user: &UserId, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["v1", "users", user.as_str(), "notes"];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Attach credentials, send, and turn non-success statuses into errors.
    async fn send(&self, request: RequestBuilder, subject: &str) -> Result<Response> {
        let auth_header = RedactedHeader::bearer(self.credential.expose_secret());
        let response = request
            .header(header::AUTHORIZATION, auth_header.as_header_value()?)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    trimmed.chars().take(200).collect()
                }
            });
        Err(ApiError::new(status, message, subject).into())
    }
}

impl NoteService for HttpNoteService {
    async fn verify_credential(&self) -> Result<Verification> {
        let url = self.endpoint(&["v1", "api-keys", "verify"])?;
        tracing::debug!(%url, "verifying API key");
        let body = serde_json::json!({ "raw_key": self.raw_key.expose_secret() });
        let response = self
            .send(self.client.post(url).json(&body), "API key")
            .await?;
        Ok(response.json().await?)
    }

    async fn list_notes(
        &self,
        user: &UserId,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Vec<NoteRecord>> {
        let url = self.notes_endpoint(user, &[])?;
        tracing::debug!(%url, limit, query, "listing notes");
        let mut request = self.client.get(url).query(&[("limit", limit.to_string())]);
        if let Some(q) = query {
            request = request.query(&[("query", q)]);
        }
        let response = self.send(request, "notes").await?;
        let list: NoteList = response.json().await?;
        Ok(list.notes)
    }

    async fn get_note(&self, user: &UserId, id: &str) -> Result<serde_json::Value> {
        let url = self.notes_endpoint(user, &[id])?;
        tracing::debug!(%url, "fetching note metadata");
        let response = self.send(self.client.get(url), id).await?;
        Ok(response.json().await?)
    }

    async fn content_page(
        &self,
        user: &UserId,
        id: &str,
        cursor: Option<&str>,
    ) -> Result<ContentPage> {
        let url = self.notes_endpoint(user, &[id, "content"])?;
        tracing::debug!(%url, cursor, "fetching content page");
        let mut request = self.client.get(url);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        let response = self.send(request, id).await?;
        Ok(response.json().await?)
    }

    async fn create_note(&self, user: &UserId, note: &NewNote) -> Result<NoteRecord> {
        let url = self.notes_endpoint(user, &[])?;
        tracing::debug!(
            %url,
            tags = note.tags.len(),
            images = note.images.len(),
            audios = note.audios.len(),
            "creating note"
        );
        let response = self.send(self.client.post(url).json(note), "new note").await?;
        Ok(response.json().await?)
    }

    async fn delete_note(&self, user: &UserId, id: &str) -> Result<()> {
        let url = self.notes_endpoint(user, &[id])?;
        tracing::debug!(%url, "deleting note");
        self.send(self.client.delete(url), id).await?;
        Ok(())
    }
}
