//! Text formatting for entries printed to the terminal.

use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

use crate::types::{Attachment, Entry};

/// Width used when attachment text is shortened.
pub const ATTACHMENT_TEXT_WIDTH: usize = 80;

/// Truncate a string to a maximum length, handling multi-byte characters properly.
/// Appends "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Collapse line breaks so text fits on a single line.
pub fn flatten(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One-line summary of an entry: `<date> - <first words of body>`.
pub fn summary_line(entry: &Entry, max_len: usize) -> String {
    let line = format!("{} - {}", entry.display_date(), flatten(&entry.body));
    truncate_string(&line, max_len)
}

/// Render the time since the latest entry: hours below a day, days beyond.
pub fn format_time_since(elapsed: Duration) -> String {
    let hours = elapsed.as_secs() / 3600;
    if hours < 24 {
        format!("{hours}h")
    } else {
        format!("{}d", hours / 24)
    }
}

/// Plain rendering used when stdout is not a terminal.
pub fn format_entry_plain(entry: &Entry) -> String {
    let mut out = format!("# {}\n", entry.display_date());
    if !entry.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", entry.tags.join(", ")));
    }
    out.push('\n');
    out.push_str(&entry.body);
    out.push('\n');
    out
}

fn push_attachment(out: &mut String, attachment: &Attachment) {
    out.push_str(&format!("  - {}\n", attachment.url));
    if let Some(text) = attachment.text.as_deref() {
        out.push_str(&format!(
            "    {}\n",
            truncate_string(&flatten(text), ATTACHMENT_TEXT_WIDTH)
        ));
    }
}

/// Full rendering for `show`: header fields, body, then attachments.
pub fn format_entry_detail(entry: &Entry) -> String {
    let label = |s: &'static str| {
        s.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    };

    let mut out = format!("{} {}\n", label("Date:"), entry.display_date());
    let tags = if entry.tags.is_empty() {
        "(none)".to_string()
    } else {
        entry.tags.join(", ")
    };
    out.push_str(&format!("{} {}\n\n", label("Tags:"), tags));
    out.push_str(&entry.body);
    out.push('\n');

    let images: Vec<&Attachment> = entry.images().collect();
    if !images.is_empty() {
        out.push_str(&format!("\n{}\n", label("Images:")));
        for image in images {
            push_attachment(&mut out, image);
        }
    }

    let audio: Vec<&Attachment> = entry.audio().collect();
    if !audio.is_empty() {
        out.push_str(&format!("\n{}\n", label("Audio:")));
        for clip in audio {
            push_attachment(&mut out, clip);
        }
    }

    out
}
