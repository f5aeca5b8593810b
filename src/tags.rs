//! Tag suggestions for new entries.
//!
//! A language model is asked for a few comma-separated single-word tags. The
//! reply is cleaned up with [`parse_tags`]. Suggestions are optional: any
//! failure is logged and the entry is saved without tags.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use reqwest::header;
use secrecy::{ExposeSecret, SecretBox};
use serde::Deserialize;

use crate::error::{JournalError, Result};

pub const MAX_TAGS: usize = 3;

const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4o-mini";

const PROMPT: &str = "Suggest up to three single-word, lowercase tags that describe the \
following journal entry. Reply with the tags separated by commas and nothing else.";

static NON_TAG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_-]+").expect("tag pattern is valid"));

/// Clean up a comma-separated tag reply.
///
/// Tags are trimmed, lowercased and stripped of punctuation. Empty tags and
/// duplicates are dropped and at most [`MAX_TAGS`] are kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let tag = NON_TAG_CHARS
            .replace_all(part.trim(), "")
            .to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

pub trait TagSuggester: Send + Sync {
    /// Return the raw, comma-separated suggestion for `text`.
    fn suggest(&self, text: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Ask `suggester` for tags, swallowing failures.
pub async fn suggest_tags<T: TagSuggester>(suggester: Option<&T>, text: &str) -> Vec<String> {
    let Some(suggester) = suggester else {
        return Vec::new();
    };
    if text.trim().is_empty() {
        return Vec::new();
    }
    match suggester.suggest(text).await {
        Ok(raw) => parse_tags(&raw),
        Err(e) => {
            tracing::warn!(error = %e, "tag suggestion failed; saving without tags");
            Vec::new()
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Tag suggester backed by the OpenAI chat completions API.
pub struct OpenAiTagSuggester {
    client: Client,
    api_key: SecretBox<String>,
}

impl OpenAiTagSuggester {
    /// Build a suggester from `OPENAI_API_KEY`, or `None` when it is unset.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        match Self::new(&key) {
            Ok(suggester) => Some(suggester),
            Err(e) => {
                tracing::warn!(error = %e, "cannot build tag suggester");
                None
            }
        }
    }

    pub fn new(api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_key: SecretBox::new(Box::new(api_key.trim().to_string())),
        })
    }
}

impl TagSuggester for OpenAiTagSuggester {
    async fn suggest(&self, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": OPENAI_MODEL,
            "messages": [
                {"role": "system", "content": PROMPT},
                {"role": "user", "content": text},
            ],
        });

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JournalError::Api(format!("tag suggestion failed: {status}")));
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                JournalError::MalformedResponse("tag suggestion reply had no content".to_string())
            })
    }
}
