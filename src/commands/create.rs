use std::io::{self, Read};
use std::path::PathBuf;

use jiff::Timestamp;
use owo_colors::OwoColorize;

use super::{record_latest, run_blocking, shared_gateway};
use crate::attachments::load_uploads;
use crate::error::Result;
use crate::remote::NewEntry;
use crate::tags::{OpenAiTagSuggester, parse_tags, suggest_tags};
use crate::tui::composer;
use crate::types::AttachmentKind;

/// Options for creating a new entry
#[derive(Debug, Default)]
pub struct CreateOptions {
    pub images: Vec<PathBuf>,
    pub audio: Vec<PathBuf>,
    pub tags: Vec<String>,
    pub no_tags: bool,
}

/// Read the entry body from piped stdin, or open the composer on a terminal.
fn read_body() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return composer::compose();
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

async fn resolve_tags(options: &CreateOptions, body: &str) -> Vec<String> {
    if !options.tags.is_empty() {
        return parse_tags(&options.tags.join(","));
    }
    if options.no_tags {
        return Vec::new();
    }
    suggest_tags(OpenAiTagSuggester::from_env().as_ref(), body).await
}

/// Create a new journal entry
pub async fn cmd_create(options: CreateOptions) -> Result<()> {
    // Read attachments first so a bad path fails before anything is typed.
    let images = load_uploads(&options.images, AttachmentKind::Image)?;
    let audios = load_uploads(&options.audio, AttachmentKind::Audio)?;

    let Some(body) = run_blocking(read_body).await? else {
        eprintln!("Nothing to save.");
        return Ok(());
    };

    let gateway = shared_gateway().await?;
    let tags = resolve_tags(&options, &body).await;

    let entry = gateway
        .create_entry(NewEntry {
            body,
            tags,
            images,
            audios,
        })
        .await?;

    record_latest(entry.created_at, Timestamp::now());

    println!("Created entry {}", entry.id.cyan());
    if !entry.tags.is_empty() {
        println!("tags: {}", entry.tags.join(", "));
    }
    Ok(())
}
